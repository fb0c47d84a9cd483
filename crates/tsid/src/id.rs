use crate::{FormatError, Result, TSID_EPOCH, decode_base32, encode_base32};
use core::fmt;
use core::str::FromStr;
use std::time::Duration;

/// A 64-bit Time-Sortable Identifier.
///
/// - 42 bits time (ms since [`TSID_EPOCH`], or a custom epoch)
/// - 22 bits random component (a node field followed by a counter field,
///   split at a width the generator chooses)
///
/// ```text
///  Bit Index:  63          22 21                    0
///              +-------------+-----------------------+
///  Field:      |  time (42)  |      random (22)      |
///              +-------------+-----------------------+
///              |<--- MSB --- 64 bits ------- LSB --->|
/// ```
///
/// The node/counter split inside the random component is a generator
/// configuration, not a property of the value, so only `time` and `random`
/// are extractable here.
///
/// Identifiers order by creation time: integer comparison and the
/// lexicographic order of the canonical 13-character text form agree.
///
/// # Example
///
/// ```
/// use tsid::Tsid;
///
/// let id = Tsid::from_raw(10);
/// assert_eq!(id.to_string(), "000000000000A");
/// assert_eq!("000000000000A".parse::<Tsid>().unwrap(), id);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tsid {
    id: u64,
}

impl Tsid {
    /// Width of the time field.
    pub const TIME_BITS: u64 = 42;

    /// Width of the random component (node + counter).
    pub const RANDOM_BITS: u64 = 22;

    /// Bitmask for extracting the 42-bit time field. Occupies bits 22
    /// through 63.
    pub const TIME_MASK: u64 = (1 << Self::TIME_BITS) - 1;

    /// Bitmask for extracting the 22-bit random component. Occupies bits 0
    /// through 21.
    pub const RANDOM_MASK: u64 = (1 << Self::RANDOM_BITS) - 1;

    /// Number of bits to shift the time field to its position (bit 22).
    pub const TIME_SHIFT: u64 = 22;

    /// Wraps a raw 64-bit value. Any value is structurally valid.
    pub const fn from_raw(id: u64) -> Self {
        Self { id }
    }

    /// Returns the raw 64-bit value.
    pub const fn to_raw(self) -> u64 {
        self.id
    }

    /// Extracts the time component, in milliseconds since the epoch the
    /// generator was configured with.
    pub const fn time(self) -> u64 {
        self.id >> Self::TIME_SHIFT
    }

    /// Extracts the 22-bit random component (node and counter fields).
    pub const fn random(self) -> u64 {
        self.id & Self::RANDOM_MASK
    }

    /// Returns the creation time in milliseconds since the Unix epoch,
    /// assuming the identifier was generated against the default
    /// [`TSID_EPOCH`].
    pub const fn unix_millis(self) -> u64 {
        self.time() + TSID_EPOCH.as_millis() as u64
    }

    /// Like [`Self::unix_millis`], for identifiers generated against a
    /// custom epoch.
    pub const fn unix_millis_with_epoch(self, epoch: Duration) -> u64 {
        self.time() + epoch.as_millis() as u64
    }

    /// Returns the identifier as 8 big-endian bytes.
    pub const fn to_be_bytes(self) -> [u8; 8] {
        self.id.to_be_bytes()
    }

    /// Reads an identifier from an 8-byte big-endian buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidByteLength`] when `bytes` is not
    /// exactly 8 bytes long.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 8] = bytes
            .try_into()
            .map_err(|_| FormatError::InvalidByteLength { len: bytes.len() })?;
        Ok(Self::from_raw(u64::from_be_bytes(arr)))
    }

    /// Encodes the identifier as its canonical 13-character Crockford
    /// base32 form.
    pub fn encode(self) -> String {
        encode_base32(self.id)
    }

    /// Decodes a canonical 13-character Crockford base32 string.
    ///
    /// Lowercase input and the `O`/`I`/`L` lookalikes are accepted; `-`
    /// separators are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] for wrong lengths, characters outside the
    /// alphabet (including the reserved `U`), or a leading character whose
    /// value exceeds 15.
    pub fn decode(s: &str) -> Result<Self> {
        let raw = decode_base32(s)?;
        Ok(Self::from_raw(raw))
    }

    /// Returns true if `s` is a decodable identifier.
    pub fn is_valid(s: &str) -> bool {
        decode_base32(s).is_ok()
    }
}

impl From<u64> for Tsid {
    fn from(id: u64) -> Self {
        Self::from_raw(id)
    }
}

impl From<Tsid> for u64 {
    fn from(id: Tsid) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for Tsid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Tsid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tsid")
            .field("id", &self.id)
            .field("time", &self.time())
            .field("random", &self.random())
            .finish()
    }
}

impl FromStr for Tsid {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}
