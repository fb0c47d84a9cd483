/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `tsid` can emit.
///
/// Configuration problems surface at builder time and are fatal to
/// construction; format problems surface on decode and are always recoverable
/// by rejecting the input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The generator configuration was rejected at build time.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A text or binary representation failed to decode.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The operation failed because the generator lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do not poison, so this
    /// variant is not available.
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator state lock poisoned")]
    LockPoisoned,
}

/// Invalid generator configuration, raised by
/// [`TsidGeneratorBuilder::build`](crate::TsidGeneratorBuilder::build).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// The node bit width must lie in `0..=20`.
    #[error("node bit width {bits} out of range (expected 0..=20)")]
    NodeBitsOutOfRange { bits: u8 },
}

/// A malformed textual or binary identifier, raised on decode.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FormatError {
    /// The input was not exactly 13 significant characters after stripping
    /// `-` separators.
    #[error("encoded length {len} is not 13 characters")]
    InvalidLength { len: usize },

    /// A character outside the Crockford base32 alphabet (including the
    /// reserved `U`).
    #[error("invalid character {character:?} at position {index}")]
    InvalidCharacter { character: char, index: usize },

    /// The leading character carried a value above 15, which would require
    /// more than 64 bits.
    #[error("leading character {character:?} exceeds the 64-bit value range")]
    ValueOverflow { character: char },

    /// A binary buffer whose length is not exactly 8 bytes.
    #[error("byte length {len} is not 8")]
    InvalidByteLength { len: usize },
}

#[cfg(not(feature = "parking-lot"))]
use std::sync::{MutexGuard, PoisonError};

// Convert all poisoned lock errors to a simplified `LockPoisoned`
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
