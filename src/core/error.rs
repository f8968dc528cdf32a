use std::io;
use thiserror::Error;

/// Capture sink inside a ruleset-control context.
///
/// Used to distinguish which buffer failed to enable during initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
pub enum BufferSink {
    /// Command output capture
    #[strum(serialize = "output")]
    Output,
    /// Engine diagnostics capture
    #[strum(serialize = "error")]
    Error,
}

/// Core error types for nftctx
#[derive(Debug, Error)]
pub enum Error {
    /// A capture buffer could not be enabled while (re)initializing a context.
    /// The context is unusable until a subsequent initialization succeeds.
    #[error("{sink} buffer could not be enabled")]
    BufferEnable {
        sink: BufferSink,
        #[source]
        source: io::Error,
    },

    /// The engine rejected a command. The message is the context's error
    /// buffer verbatim; `code` is the engine's non-zero return code.
    #[error("{message}")]
    Command { message: String, code: i32 },

    /// A requested state change silently did not take effect
    #[error("{change} change failed")]
    StateVerification { change: &'static str },

    /// Caller violated an argument contract
    #[error("invalid argument: {0}")]
    Argument(String),

    /// Operation requires a live context and none exists
    #[error("context not initialized")]
    Uninitialized,

    /// Engine output could not be parsed as JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_enable_message_names_sink() {
        let err = Error::BufferEnable {
            sink: BufferSink::Output,
            source: io::Error::other("rejected"),
        };
        assert_eq!(err.to_string(), "output buffer could not be enabled");

        let err = Error::BufferEnable {
            sink: BufferSink::Error,
            source: io::Error::other("rejected"),
        };
        assert_eq!(err.to_string(), "error buffer could not be enabled");
    }

    #[test]
    fn test_command_error_is_verbatim() {
        let err = Error::Command {
            message: "Error: syntax error, unexpected junk".to_string(),
            code: 1,
        };
        // No wrapping or reinterpretation of the engine's text
        assert_eq!(err.to_string(), "Error: syntax error, unexpected junk");
    }

    #[test]
    fn test_state_verification_message() {
        let err = Error::StateVerification {
            change: "Dry Run mode",
        };
        assert_eq!(err.to_string(), "Dry Run mode change failed");
    }

    #[test]
    fn test_sink_display() {
        assert_eq!(BufferSink::Output.to_string(), "output");
        assert_eq!(BufferSink::Error.to_string(), "error");
    }
}
