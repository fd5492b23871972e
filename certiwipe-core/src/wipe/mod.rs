//! Wipe module - the fastboot wipe workflow

mod runner;
mod session;
mod stages;


pub use runner::WipeReport;
pub use session::{CommandOutput, WipeSession};

use crate::cancel::CancelToken;
use crate::config::WipeConfig;
use crate::confirm::Prompter;
use certiwipe_hal::WipeHal;
use std::sync::Arc;

/// Run a full wipe against `hal`, answering prompts from `prompter`.
pub fn run_with_hal(
    config: WipeConfig,
    hal: Arc<dyn WipeHal>,
    prompter: &dyn Prompter,
    cancel: CancelToken,
) -> WipeReport {
    WipeSession::new(config, hal, prompter, cancel).run()
}
