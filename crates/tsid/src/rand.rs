/// A trait for random sources that return random integers.
///
/// This abstraction allows you to plug in a real random source or a mocked
/// random source in tests. The generator draws one value per counter reset
/// and masks it down to the counter width.
///
/// # Example
///
/// ```
/// use tsid::RandSource;
///
/// struct FixedRand;
/// impl RandSource for FixedRand {
///     fn rand(&self) -> u64 {
///         1234
///     }
/// }
///
/// let rng = FixedRand;
/// assert_eq!(rng.rand(), 1234);
/// ```
pub trait RandSource {
    /// Returns a random integer.
    fn rand(&self) -> u64;
}

/// A [`RandSource`] adapting a byte-buffer supplier.
///
/// Each call requests 8 bytes and folds them big-endian into a `u64`. A
/// supplier that returns an empty (or short) buffer yields a fixed value of
/// zero instead of an error, so a no-op supplier produces a fully
/// deterministic generator for reproducible tests.
pub struct ByteRandom<F>
where
    F: Fn(usize) -> Vec<u8>,
{
    supplier: F,
}

impl<F> ByteRandom<F>
where
    F: Fn(usize) -> Vec<u8>,
{
    /// Wraps a supplier that is handed the number of bytes requested.
    pub fn new(supplier: F) -> Self {
        Self { supplier }
    }
}

impl<F> RandSource for ByteRandom<F>
where
    F: Fn(usize) -> Vec<u8>,
{
    fn rand(&self) -> u64 {
        let bytes = (self.supplier)(size_of::<u64>());
        bytes
            .iter()
            .take(size_of::<u64>())
            .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
    }
}
