#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    RandSource, Result, TSID_EPOCH, ThreadRandom, TimeSource, Tsid, WallClock,
    generator::{Mutex, TsidGeneratorBuilder},
};

/// Backward clock movement up to this window (in milliseconds) is treated as
/// "same logical time" instead of a new timestamp, covering NTP step-backs
/// and leap-second rollback without breaking monotonicity.
pub const CLOCK_DRIFT_TOLERANCE: u64 = 10_000;

/// Mutable generator state, updated as a unit inside one critical section.
pub(crate) struct EngineState {
    pub(crate) last_time: u64,
    pub(crate) counter: u64,
}

/// A monotonic, clock-drift-tolerant TSID generator.
///
/// Each instance owns a node id and a `{last_time, counter}` record behind a
/// single mutex, so a shared reference can be used from any number of
/// threads; instances are independent and need no coordination with each
/// other.
///
/// Per millisecond an instance can mint `2^counter_bits` identifiers (4096
/// with the default 10-bit node / 12-bit counter split). When the counter
/// overflows within one millisecond the generator carries forward: it
/// borrows the next millisecond for the time field and redraws the counter,
/// keeping the output strictly increasing without refusing the call.
///
/// ## Recommended When
/// - You need ids that sort by creation time
/// - Multiple processes mint ids without a coordination service
///
/// # Example
///
/// ```
/// use tsid::TsidGenerator;
///
/// let generator = TsidGenerator::new_1024(1);
///
/// let a = generator.try_create().unwrap();
/// let b = generator.try_create().unwrap();
/// assert!(a < b);
/// ```
pub struct TsidGenerator<T = WallClock, R = ThreadRandom>
where
    T: TimeSource,
    R: RandSource,
{
    pub(crate) node: u64,
    pub(crate) node_bits: u8,
    pub(crate) counter_bits: u8,
    pub(crate) counter_mask: u64,
    pub(crate) epoch_millis: u64,
    pub(crate) time: T,
    pub(crate) rng: R,
    #[cfg(feature = "cache-padded")]
    pub(crate) state: crossbeam_utils::CachePadded<Mutex<EngineState>>,
    #[cfg(not(feature = "cache-padded"))]
    pub(crate) state: Mutex<EngineState>,
}

impl TsidGenerator {
    /// Returns a builder over the default wall clock and thread-local RNG.
    pub fn builder() -> TsidGeneratorBuilder {
        TsidGeneratorBuilder::new()
    }

    /// Creates a generator for deployments of up to 256 nodes (8 node bits,
    /// 14 counter bits: 16 384 ids per millisecond).
    pub fn new_256(node: u64) -> Self {
        Self::from_parts(node, 8, TSID_EPOCH.as_millis() as u64, WallClock, ThreadRandom)
    }

    /// Creates a generator for deployments of up to 1024 nodes (10 node
    /// bits, 12 counter bits: 4096 ids per millisecond). This is the default
    /// split.
    pub fn new_1024(node: u64) -> Self {
        Self::from_parts(node, 10, TSID_EPOCH.as_millis() as u64, WallClock, ThreadRandom)
    }

    /// Creates a generator for deployments of up to 4096 nodes (12 node
    /// bits, 10 counter bits: 1024 ids per millisecond).
    pub fn new_4096(node: u64) -> Self {
        Self::from_parts(node, 12, TSID_EPOCH.as_millis() as u64, WallClock, ThreadRandom)
    }
}

impl<T, R> TsidGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    /// Assembles a generator from an already-validated configuration.
    ///
    /// `node_bits` must have been checked against
    /// [`MAX_NODE_BITS`](crate::MAX_NODE_BITS); the builder is the only
    /// public path here.
    pub(crate) fn from_parts(node: u64, node_bits: u8, epoch_millis: u64, time: T, rng: R) -> Self {
        debug_assert!(u64::from(node_bits) <= Tsid::RANDOM_BITS);
        let counter_bits = Tsid::RANDOM_BITS as u8 - node_bits;
        let counter_mask = (1u64 << counter_bits) - 1;
        let node_mask = (1u64 << node_bits) - 1;
        let state = EngineState {
            last_time: 0,
            counter: 0,
        };
        Self {
            node: node & node_mask,
            node_bits,
            counter_bits,
            counter_mask,
            epoch_millis,
            time,
            rng,
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(state)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(state),
        }
    }

    /// The node id embedded in every identifier this generator mints.
    pub fn node(&self) -> u64 {
        self.node
    }

    /// Width of the node field.
    pub fn node_bits(&self) -> u8 {
        self.node_bits
    }

    /// Width of the counter field (`22 - node_bits`).
    pub fn counter_bits(&self) -> u8 {
        self.counter_bits
    }

    /// Generates the next identifier.
    ///
    /// With `parking-lot` the critical section cannot poison, so generation
    /// is infallible.
    #[cfg(feature = "parking-lot")]
    pub fn create(&self) -> Tsid {
        let mut state = self.state.lock();
        self.advance(&mut state)
    }

    /// Generates the next identifier with fallible error handling.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`](crate::Error::LockPoisoned) if
    /// another thread panicked while holding the state lock. With the
    /// `parking-lot` feature this method never fails.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_create(&self) -> Result<Tsid> {
        #[cfg(feature = "parking-lot")]
        let mut state = self.state.lock();
        #[cfg(not(feature = "parking-lot"))]
        let mut state = self.state.lock()?;

        Ok(self.advance(&mut state))
    }

    /// Advances the `{last_time, counter}` record by one identifier.
    ///
    /// Caller holds the state lock; the clock and rng reads happen inside
    /// that same critical section.
    fn advance(&self, state: &mut EngineState) -> Tsid {
        let now = self.time.current_millis().saturating_sub(self.epoch_millis);

        if now <= state.last_time && now + CLOCK_DRIFT_TOLERANCE > state.last_time {
            // Same millisecond as the previous call, or a backward step
            // smaller than the tolerance window: keep the timestamp and
            // increment. On counter exhaustion, borrow the next millisecond
            // and redraw, so the sequence never stalls or regresses.
            state.counter += 1;
            if state.counter > self.counter_mask {
                state.last_time += 1;
                state.counter = self.random_counter();
            }
        } else {
            // The clock advanced, or regressed past the tolerance window.
            state.last_time = now;
            state.counter = self.random_counter();
        }

        self.pack(state.last_time, state.counter)
    }

    /// Draws a fresh counter start, uniform over `[0, 2^counter_bits)`.
    fn random_counter(&self) -> u64 {
        self.rng.rand() & self.counter_mask
    }

    fn pack(&self, time: u64, counter: u64) -> Tsid {
        let time = (time & Tsid::TIME_MASK) << Tsid::TIME_SHIFT;
        let node = self.node << self.counter_bits;
        Tsid::from_raw(time | node | counter)
    }
}
