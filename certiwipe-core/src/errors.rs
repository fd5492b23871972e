pub use certiwipe_error::WipeError;
use std::io;

/// True when `err` (or anything it wraps) is a Ctrl+C interruption.
pub fn is_interrupted(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<WipeError>(),
            Some(WipeError::Interrupted)
        )
    })
}

/// True when a blocking read was cut short by a signal (`io::ErrorKind::Interrupted`
/// anywhere in the chain). Terminal prompts fail this way when Ctrl+C is pressed.
pub fn is_read_interrupted(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::Interrupted)
    })
}
