//! UI primitives for the Gloss CLI.
//!
//! - **Context**: environment detection (TTY, color)
//! - **Mode**: output mode resolution (json, plain, pretty)
//! - **Theme**: badges and text styles
//! - **Render**: tables, receipts, hints, highlighted passages
//! - **Progress**: spinners

mod context;
mod mode;
pub mod progress;
pub mod render;
pub mod theme;

pub use context::UiContext;
pub use mode::OutputMode;
pub use theme::Badge;

pub use progress::with_spinner;
pub use render::{badge, hint, kv, mark, print, print_error, receipt, table};
