/// Errors produced while decoding out-of-band traffic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The datagram was shorter than the marker or did not start with it.
    #[error("malformed out-of-band frame ({len} bytes)")]
    MalformedFrame { len: usize },

    /// The status payload was empty or lacked the `statusResponse` header.
    #[error("invalid status payload: {0}")]
    InvalidStatusPayload(String),

    /// A player line did not have the `score ping "name"` shape.
    #[error("unparseable player line: {0:?}")]
    UnparseablePlayerLine(String),

    /// A server address could not be split into host and port.
    #[error("invalid server address: {0:?}")]
    InvalidServerAddress(String),
}
