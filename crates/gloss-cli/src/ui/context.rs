//! UI context for environment detection.

use std::io::IsTerminal;

use super::OutputMode;

/// Terminal and environment context for UI decisions.
#[derive(Debug, Clone)]
pub struct UiContext {
    /// Whether stdout is a TTY
    pub is_tty: bool,
    /// Whether color output is enabled
    pub color: bool,
    /// Resolved output mode
    pub mode: OutputMode,
}

impl UiContext {
    /// Create context from environment and CLI flags.
    ///
    /// Color is off when `NO_COLOR` is set, `--no-color` is passed, stdout is
    /// not a TTY, or `TERM=dumb`.
    pub fn from_env(json_flag: bool, no_color_flag: bool) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let term_is_dumb = std::env::var("TERM").map(|v| v == "dumb").unwrap_or(false);
        let no_color_env = std::env::var("NO_COLOR").is_ok();

        Self {
            is_tty,
            color: is_tty && !no_color_flag && !no_color_env && !term_is_dumb,
            mode: OutputMode::resolve(json_flag, is_tty, term_is_dumb),
        }
    }

    /// Same context with JSON output forced on or left as is.
    pub fn with_json(&self, json: bool) -> Self {
        let mut ctx = self.clone();
        if json {
            ctx.mode = OutputMode::Json;
            ctx.color = false;
        }
        ctx
    }

    /// Check if animations (spinners) are allowed.
    pub fn allows_animation(&self) -> bool {
        self.is_tty && self.mode == OutputMode::Pretty
    }
}
