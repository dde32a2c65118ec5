//! Storage abstraction for Gloss.
//!
//! ## Architecture
//!
//! - [`StorageMedium`]: opaque key-value medium for serialized envelopes
//!   (SQLite file, or memory for tests and ephemeral sessions)
//! - [`SecureStore`]: named records encoded through the envelope codec
//!   under the shared key
//!
//! The store is the only writer of the medium. Operations on different
//! names share no state beyond the medium itself.

pub mod medium;
pub mod memory;
pub mod secure;
pub mod sqlite;

pub use medium::StorageMedium;
pub use memory::MemoryMedium;
pub use secure::{Lookup, SecureStore};
pub use sqlite::SqliteMedium;
