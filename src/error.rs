//! Error Types
//!
//! Failures in the coordination core never surface to the user: every error
//! degrades to "no clipboard change" plus a diagnostic log entry at the call
//! site. The variants here exist so call sites can classify what went wrong
//! before swallowing it.

use thiserror::Error;

/// Result type for coordination operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coordination error types
#[derive(Error, Debug)]
pub enum Error {
    /// A tab id referred to a closed or never-opened tab
    #[error("tab {0} does not exist or is no longer tracked")]
    StaleTab(i64),

    /// A message could not be delivered to the other context
    #[error("message transport failed: {0}")]
    Transport(String),

    /// A menu activation carried an id outside the known entry set
    #[error("unknown menu item id: {0}")]
    UnknownMenuItem(String),

    /// The platform clipboard rejected the write
    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    /// Configuration was structurally valid but semantically wrong
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An internal channel closed while a send was in flight
    #[error("channel send failed")]
    ChannelSend,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure classification for the degradation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Malformed or missing input; treated as "nothing to copy"
    InvalidInput,
    /// Reference to state that no longer exists; silent no-op
    StaleReference,
    /// Cross-context delivery failure; logged and swallowed
    Transport,
    /// Platform surface failure (clipboard, IO)
    Platform,
}

/// Classify an error for logging and degradation decisions
pub fn classify(error: &Error) -> FailureKind {
    match error {
        Error::StaleTab(_) => FailureKind::StaleReference,

        Error::Transport(_) | Error::ChannelSend => FailureKind::Transport,

        Error::UnknownMenuItem(_) | Error::InvalidConfig(_) => FailureKind::InvalidInput,

        Error::Clipboard(_) | Error::Io(_) => FailureKind::Platform,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_stale_tab() {
        assert_eq!(classify(&Error::StaleTab(7)), FailureKind::StaleReference);
    }

    #[test]
    fn test_classify_transport() {
        assert_eq!(
            classify(&Error::Transport("gone".into())),
            FailureKind::Transport
        );
        assert_eq!(classify(&Error::ChannelSend), FailureKind::Transport);
    }

    #[test]
    fn test_classify_invalid_input() {
        assert_eq!(
            classify(&Error::UnknownMenuItem("bogus".into())),
            FailureKind::InvalidInput
        );
    }
}
