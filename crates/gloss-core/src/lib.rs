//! # Gloss Core
//!
//! Core library for Gloss - persistent, optionally encrypted annotations on
//! third-party documents.
//!
//! This crate provides anchoring, envelope encryption and record storage
//! independent of any host or CLI.
//!
//! ## Architecture
//!
//! - **crypto**: passphrase key derivation and the shared key holder
//! - **envelope**: plaintext / AES-GCM record envelopes
//! - **storage**: storage medium trait, SQLite and memory media, secure store
//! - **document**: live element/text tree and XHTML loader
//! - **anchor**: reload-stable text anchors
//! - **annotations**: per-page highlight and note sets
//!
//! Leaves first: the key manager feeds the envelope codec, which the secure
//! store uses; annotation management sits on the store and the anchor codec.

pub mod anchor;
pub mod annotations;
pub mod crypto;
pub mod document;
pub mod envelope;
pub mod error;
pub mod service;
pub mod storage;

pub use anchor::{Anchor, AnchorCodec, AnchorPolicy, PathSegment};
pub use annotations::{AnnotationManager, AnnotationSet, NewNote, Note, PageSession, PageState};
pub use crypto::{KeyDerivationParams, KeyManager};
pub use document::{Boundary, Document, NodeId, Span};
pub use envelope::{Envelope, EnvelopeCodec};
pub use error::{GlossError, Result};
pub use service::Gloss;
pub use storage::{Lookup, SecureStore, StorageMedium};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
