use std::time::Duration;

use crate::{
    ConfigurationError, NodeIdSource, RandSource, Result, TSID_EPOCH, ThreadRandom, TimeSource,
    TsidGenerator, WallClock,
};

/// Largest accepted node bit width.
pub const MAX_NODE_BITS: u8 = 20;

/// Node bit width used when none is configured (1024 nodes, 4096 ids per
/// millisecond per node).
pub const DEFAULT_NODE_BITS: u8 = 10;

/// Configures and constructs a [`TsidGenerator`].
///
/// Everything is resolved once at [`build`](Self::build); the resulting
/// generator is immutable apart from its internal `{last_time, counter}`
/// record.
///
/// The node id resolves with this precedence:
///
/// 1. an explicit [`node`](Self::node) value,
/// 2. a [`node_source`](Self::node_source) collaborator,
/// 3. a random draw from the configured random source.
///
/// # Example
///
/// ```
/// use tsid::TsidGenerator;
///
/// let generator = TsidGenerator::builder()
///     .node(42)
///     .node_bits(12)
///     .build()
///     .unwrap();
/// assert_eq!(generator.node(), 42);
/// assert_eq!(generator.counter_bits(), 10);
/// ```
pub struct TsidGeneratorBuilder<T = WallClock, R = ThreadRandom>
where
    T: TimeSource,
    R: RandSource,
{
    node: Option<u64>,
    node_source: Option<Box<dyn NodeIdSource>>,
    node_bits: u8,
    epoch: Duration,
    time: T,
    rng: R,
}

impl TsidGeneratorBuilder {
    /// Starts a builder over the default wall clock and thread-local RNG.
    pub fn new() -> Self {
        Self {
            node: None,
            node_source: None,
            node_bits: DEFAULT_NODE_BITS,
            epoch: TSID_EPOCH,
            time: WallClock,
            rng: ThreadRandom,
        }
    }
}

impl Default for TsidGeneratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R> TsidGeneratorBuilder<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    /// Sets an explicit node id. Takes precedence over any
    /// [`node_source`](Self::node_source). The value is masked to the
    /// configured node width.
    pub fn node(mut self, node: u64) -> Self {
        self.node = Some(node);
        self
    }

    /// Sets a node-id collaborator consulted when no explicit node id is
    /// given, e.g. a closure reading deployment configuration.
    pub fn node_source(mut self, source: impl NodeIdSource + 'static) -> Self {
        self.node_source = Some(Box::new(source));
        self
    }

    /// Sets the node field width, `0..=20` bits. The counter takes the
    /// remaining `22 - node_bits` bits.
    pub fn node_bits(mut self, bits: u8) -> Self {
        self.node_bits = bits;
        self
    }

    /// Sets a custom epoch as a duration since the Unix epoch. The time
    /// field counts milliseconds from this origin.
    pub fn epoch(mut self, epoch: Duration) -> Self {
        self.epoch = epoch;
        self
    }

    /// Replaces the time source, e.g. with a fixed clock in tests.
    pub fn clock<T2>(self, time: T2) -> TsidGeneratorBuilder<T2, R>
    where
        T2: TimeSource,
    {
        TsidGeneratorBuilder {
            node: self.node,
            node_source: self.node_source,
            node_bits: self.node_bits,
            epoch: self.epoch,
            time,
            rng: self.rng,
        }
    }

    /// Replaces the random source, e.g. with a fixed value in tests.
    pub fn random<R2>(self, rng: R2) -> TsidGeneratorBuilder<T, R2>
    where
        R2: RandSource,
    {
        TsidGeneratorBuilder {
            node: self.node,
            node_source: self.node_source,
            node_bits: self.node_bits,
            epoch: self.epoch,
            time: self.time,
            rng,
        }
    }

    /// Resolves the configuration into an immutable generator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NodeBitsOutOfRange`] when the node bit
    /// width lies outside `0..=20`. Generation itself never revisits this
    /// validation.
    pub fn build(self) -> Result<TsidGenerator<T, R>> {
        if self.node_bits > MAX_NODE_BITS {
            return Err(ConfigurationError::NodeBitsOutOfRange {
                bits: self.node_bits,
            }
            .into());
        }

        let node = self
            .node
            .or_else(|| self.node_source.as_ref().and_then(|s| s.node_id()))
            .unwrap_or_else(|| self.rng.rand());

        Ok(TsidGenerator::from_parts(
            node,
            self.node_bits,
            self.epoch.as_millis() as u64,
            self.time,
            self.rng,
        ))
    }
}
