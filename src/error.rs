//! Structured runtime errors.

use thiserror::Error;

/// Errors the runtime itself can raise, distinct from whatever `anyhow`-style error a user
/// handler might produce (which is carried inside [`RuntimeError::HandlerFailed`]).
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A component received a second `Init` after already being initialized.
    #[error("component received Init more than once")]
    DoubleInit,

    /// A reactor or window received a message outside its closed dispatch set.
    #[error("component received an unsupported message kind: {0}")]
    UnknownMessage(&'static str),

    /// A user-supplied handler returned an error.
    #[error("handler failed: {source}")]
    HandlerFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The runtime backend was changed after the first component had already been spawned.
    #[error("backend cannot be changed after the first spawn")]
    BackendAlreadyConfigured,
}

impl RuntimeError {
    /// Whether retrying the same operation might succeed without any intervention (e.g. a
    /// momentarily full bounded mailbox). None of our current variants are transient; this
    /// stays as an extension point for future backends (spec.md §9 multi-process backends).
    pub fn is_transient(&self) -> bool {
        false
    }

    /// Whether the component that produced this error must stop rather than continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::DoubleInit | Self::UnknownMessage(_))
    }

    /// Whether a supervising caller could plausibly recover by restarting the component.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::HandlerFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_init_is_fatal_not_recoverable() {
        let err = RuntimeError::DoubleInit;
        assert!(err.is_fatal());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn handler_failure_is_recoverable_not_fatal() {
        let err = RuntimeError::HandlerFailed {
            source: Box::new(std::io::Error::other("boom")),
        };
        assert!(err.is_recoverable());
        assert!(!err.is_fatal());
    }
}
