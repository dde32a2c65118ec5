//! Progress indicators for long-running operations using indicatif.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::context::UiContext;

/// A spinner for indeterminate progress, drawn on stderr.
///
/// Inert when the context does not allow animation.
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn new(ctx: &UiContext, message: &str) -> Self {
        let bar = ctx.allows_animation().then(|| {
            let pb = ProgressBar::new_spinner();
            let template = if ctx.color {
                "{spinner:.cyan} {msg}..."
            } else {
                "{spinner} {msg}..."
            };
            if let Ok(style) = ProgressStyle::default_spinner().template(template) {
                pb.set_style(style.tick_strings(&["|", "/", "-", "\\", ""]));
            }
            pb.set_message(message.to_string());
            pb.enable_steady_tick(Duration::from_millis(80));
            pb
        });
        Self { bar }
    }

    pub fn is_active(&self) -> bool {
        self.bar.is_some()
    }

    /// Remove the spinner line.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.finish();
    }
}

/// Run `work` with a spinner showing `message`.
pub fn with_spinner<T>(ctx: &UiContext, message: &str, work: impl FnOnce() -> T) -> T {
    let spinner = Spinner::new(ctx, message);
    let result = work();
    spinner.finish();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::OutputMode;

    #[test]
    fn test_spinner_inert_without_tty() {
        let ctx = UiContext {
            is_tty: false,
            color: false,
            mode: OutputMode::Plain,
        };
        let spinner = Spinner::new(&ctx, "Deriving key");
        assert!(!spinner.is_active());
        spinner.finish();
    }

    #[test]
    fn test_with_spinner_returns_work_result() {
        let ctx = UiContext {
            is_tty: false,
            color: false,
            mode: OutputMode::Json,
        };
        assert_eq!(with_spinner(&ctx, "Working", || 41 + 1), 42);
    }
}
