//! Out-of-band framing: every request and response starts with four `0xFF` bytes.

use crate::error::ProtocolError;
use std::borrow::Cow;

/// Marker that distinguishes out-of-band control traffic from game traffic.
pub const OOB_MARKER: [u8; 4] = [0xFF; 4];

/// Prepends the out-of-band marker to `payload`.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut datagram = Vec::with_capacity(OOB_MARKER.len() + payload.len());
    datagram.extend_from_slice(&OOB_MARKER);
    datagram.extend_from_slice(payload);
    datagram
}

/// Strips the out-of-band marker from a received datagram.
///
/// Fails with [`ProtocolError::MalformedFrame`] when the datagram is shorter
/// than the marker or does not begin with it.
pub fn unframe(datagram: &[u8]) -> Result<&[u8], ProtocolError> {
    match datagram.strip_prefix(&OOB_MARKER[..]) {
        Some(payload) => Ok(payload),
        None => Err(ProtocolError::MalformedFrame {
            len: datagram.len(),
        }),
    }
}

/// Returns the payload without the marker if it is present, otherwise unchanged.
pub(crate) fn strip_marker(raw: &[u8]) -> &[u8] {
    unframe(raw).unwrap_or(raw)
}

/// Decodes payload text without losing bytes.
///
/// Valid UTF-8 is borrowed as is. Anything else is mapped byte for byte onto
/// `U+0000..=U+00FF`, so high-bit name characters survive and
/// `text.chars().map(|c| c as u8)` gives back the original bytes.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}
