use thiserror::Error;

/// Errors raised while describing, sending or decoding wire-protocol commands.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote address could not be parsed as an absolute URL.
    #[error("invalid remote address {address:?}: {reason}")]
    InvalidUrl { address: String, reason: String },

    /// A command with this name is already registered.
    #[error("command already registered: {0}")]
    DuplicateCommand(String),

    /// No command with this name is registered on the executor.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A URL template placeholder has no value in the command.
    #[error("command {command} is missing a value for {{{placeholder}}}")]
    MissingParameter { command: String, placeholder: String },

    /// The command requires a session but none has been negotiated.
    #[error("command {0} requires an active session")]
    NoSession(String),

    /// The HTTP round-trip itself failed (connect, timeout, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote end answered with a protocol-level error.
    #[error("remote command failed (status {status}): {message}")]
    Command { status: i64, message: String },

    /// The response body was not a recognisable wire-protocol payload.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
