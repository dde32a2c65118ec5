//! Application-level utilities for the Gloss CLI.
//!
//! - Application context bundling CLI args, config and UI settings
//! - Store path resolution
//! - Passphrase resolution (env, keychain, prompt)

mod context;
mod passphrase;

pub use context::AppContext;
pub use passphrase::{prompt_new_passphrase, resolve_passphrase, PassphraseSource};
