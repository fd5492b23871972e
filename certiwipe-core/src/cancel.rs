//! Ctrl+C cancellation handling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

static HANDLER_SET: OnceLock<()> = OnceLock::new();

/// Shared interruption flag, polled by the workflow between and inside stages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Route SIGINT into `token` instead of killing the process, so the log still gets written.
pub fn install_ctrlc_handler(token: CancelToken) -> anyhow::Result<()> {
    if HANDLER_SET.get().is_some() {
        return Ok(());
    }

    ctrlc::set_handler(move || {
        token.cancel();
        log::warn!("Cancellation requested (Ctrl+C).");
    })?;

    let _ = HANDLER_SET.set(());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        assert!(other.is_cancelled());
    }
}
