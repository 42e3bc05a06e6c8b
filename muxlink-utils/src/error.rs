//! Error types for muxlink
//!
//! Provides a unified error type used across all muxlink crates.

use std::path::PathBuf;

/// Main error type for muxlink operations
#[derive(Debug, thiserror::Error)]
pub enum MuxlinkError {
    // === IO Errors ===

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Control Link Errors ===

    #[error("Failed to start control channel: {0}")]
    ChannelStart(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Control link is closed")]
    LinkClosed,

    // === Configuration Errors ===

    #[error("Configuration error: {0}")]
    Config(String),

    // === Internal Errors ===

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MuxlinkError {
    /// Create a channel start error
    pub fn channel_start(msg: impl Into<String>) -> Self {
        Self::ChannelStart(msg.into())
    }

    /// Create a send error
    pub fn send(msg: impl Into<String>) -> Self {
        Self::Send(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check whether this error means the link is unusable and should be
    /// closed rather than retried.
    pub fn is_link_dead(&self) -> bool {
        matches!(self, Self::Send(_) | Self::LinkClosed)
    }
}

/// Result type alias using MuxlinkError
pub type Result<T> = std::result::Result<T, MuxlinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MuxlinkError::ChannelStart("tmux not found".into());
        assert_eq!(
            err.to_string(),
            "Failed to start control channel: tmux not found"
        );
    }

    #[test]
    fn test_error_display_send() {
        let err = MuxlinkError::Send("broken pipe".into());
        assert_eq!(err.to_string(), "Send failed: broken pipe");
    }

    #[test]
    fn test_error_display_link_closed() {
        assert_eq!(MuxlinkError::LinkClosed.to_string(), "Control link is closed");
    }

    #[test]
    fn test_error_display_file_write() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = MuxlinkError::FileWrite {
            path: PathBuf::from("/var/log/muxlink.log"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to write file"));
        assert!(msg.contains("/var/log/muxlink.log"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: MuxlinkError = io_err.into();
        assert!(matches!(err, MuxlinkError::Io(_)));
    }

    #[test]
    fn test_link_dead_classification() {
        assert!(MuxlinkError::LinkClosed.is_link_dead());
        assert!(MuxlinkError::send("eof").is_link_dead());
        assert!(!MuxlinkError::channel_start("x").is_link_dead());
        assert!(!MuxlinkError::config("x").is_link_dead());
    }

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(
            MuxlinkError::channel_start("pty"),
            MuxlinkError::ChannelStart(_)
        ));
        assert!(matches!(MuxlinkError::send("w"), MuxlinkError::Send(_)));
        assert!(matches!(
            MuxlinkError::config("bad"),
            MuxlinkError::Config(_)
        ));
        assert!(matches!(
            MuxlinkError::internal("oops"),
            MuxlinkError::Internal(_)
        ));
    }

    #[test]
    fn test_result_alias() {
        let ok: Result<u32> = Ok(7);
        assert_eq!(ok.unwrap(), 7);
        let err: Result<u32> = Err(MuxlinkError::LinkClosed);
        assert!(err.is_err());
    }
}
