//! Persistent medium trait.
//!
//! A `StorageMedium` holds opaque envelope strings by record name. It knows
//! nothing about encryption; [`super::SecureStore`] layers the envelope codec
//! on top. Implementations must make `write` replace the previous value as
//! one unit and must confine a failure to the call that hit it.

use async_trait::async_trait;

use crate::error::Result;

/// Key-value medium for serialized envelopes.
#[async_trait]
pub trait StorageMedium: Send + Sync {
    /// Read the envelope stored under `name`.
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if nothing is stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns `GlossError::StorageUnavailable` if the medium cannot be read.
    async fn read(&self, name: &str) -> Result<Option<String>>;

    /// Store `envelope` under `name`, replacing any previous value atomically.
    async fn write(&self, name: &str, envelope: &str) -> Result<()>;

    /// Remove the value stored under `name`. Removing a missing name is not an error.
    async fn remove(&self, name: &str) -> Result<()>;

    /// List stored names starting with `prefix`, in ascending order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}
