pub mod anchor;
pub mod annotate;
pub mod keychain;
pub mod misc;
pub mod record;
