use std::time::Duration;

use anyhow::{Context, Result};
use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::{Interaction, SpinnerHandle, SpinnerInteraction};

const TICK_INTERVAL: Duration = Duration::from_millis(100);

impl SpinnerInteraction for Interaction {
    fn start_spinner(&self, message: String) -> Result<SpinnerHandle> {
        // Spinners go to stderr, and only when a user is watching.
        let target = if Term::stderr().is_term() {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };

        let style = ProgressStyle::with_template("{spinner:.green} {msg}")
            .context("building spinner style")?;
        let spinner = ProgressBar::with_draw_target(None, target)
            .with_style(style)
            .with_message(message);
        spinner.enable_steady_tick(TICK_INTERVAL);

        Ok(SpinnerHandle::new(Box::new(move || spinner.finish_and_clear())))
    }
}
