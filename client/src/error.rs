use protocol::ProtocolError;
use std::path::PathBuf;

/// Errors raised by the networked side of the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server host name did not resolve to any address.
    #[error("could not resolve server address {0}")]
    Resolve(String),

    /// Socket I/O failed.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// An inbound payload could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A transcript line could not be written.
    #[error("failed to write log {path}: {source}")]
    LogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The preferences file is not valid JSON for [`crate::config::Preferences`].
    #[error("invalid preferences: {0}")]
    Preferences(#[from] serde_json::Error),
}
