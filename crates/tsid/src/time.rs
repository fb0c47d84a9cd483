use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Default epoch: Wednesday, January 1, 2020 00:00:00 UTC.
///
/// The 42-bit time field counts milliseconds from this origin, which keeps it
/// from overflowing until roughly the year 2159.
pub const TSID_EPOCH: Duration = Duration::from_millis(1_577_836_800_000);

/// A trait for time sources that return the current wall-clock time.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests. The unit is **milliseconds since the Unix epoch**;
/// the generator subtracts its configured epoch itself, so a custom epoch
/// never leaks into clock implementations.
///
/// # Example
///
/// ```
/// use tsid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

/// The default [`TimeSource`], backed by [`SystemTime`].
///
/// This is deliberately a plain wall clock rather than a monotonic timer: the
/// generator's drift-tolerance window exists to absorb the backward steps a
/// wall clock can take (NTP adjustment, leap-second rollback), and it can
/// only do so if it observes them.
#[derive(Default, Clone, Debug)]
pub struct WallClock;

impl TimeSource for WallClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64
    }
}
