//! Time-Sortable Identifiers: 64-bit ids that increase with time, are minted
//! without cross-node coordination, and encode to a fixed-width,
//! lexicographically sortable 13-character Crockford base32 string.
//!
//! # Example
//!
//! ```
//! use tsid::{Tsid, TsidGenerator};
//!
//! let generator = TsidGenerator::new_1024(1);
//!
//! let id = generator.try_create().unwrap();
//! let text = id.to_string();
//! assert_eq!(text.len(), 13);
//! assert_eq!(Tsid::decode(&text).unwrap(), id);
//! ```

mod base32;
mod error;
mod generator;
mod id;
mod node;
mod rand;
mod thread_random;
mod time;

pub use crate::base32::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::node::*;
pub use crate::rand::*;
pub use crate::thread_random::*;
pub use crate::time::*;
