//! Shape-based response dispatch.
//!
//! The protocol carries no request/response correlation id. A `getstatus`
//! reply and an `rcon` reply arriving on the same socket can only be told
//! apart by the header token that starts the payload, so every inbound
//! payload goes through [`route`] and nowhere else. If both request kinds are
//! in flight at once, attribution relies solely on this header; no timing or
//! source-port heuristics are applied.

/// Header token of a `getstatus` reply.
pub const STATUS_RESPONSE_HEADER: &[u8] = b"statusResponse";

/// Header token of a console (`rcon`) reply.
pub const PRINT_HEADER: &[u8] = b"print";

/// Destination of an unframed inbound payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Status reply, handed to the status parser.
    Status,
    /// Console output, handed to the output parser.
    Console,
}

/// Routes an unframed payload by its leading header token.
///
/// `statusResponse` goes to [`Channel::Status`]. `print` and every other
/// shape go to [`Channel::Console`], since the console channel accepts
/// whatever the server prints.
pub fn route(payload: &[u8]) -> Channel {
    if has_header(payload, STATUS_RESPONSE_HEADER) {
        Channel::Status
    } else {
        Channel::Console
    }
}

/// True when `payload` starts with `token` as a whole word.
pub(crate) fn has_header(payload: &[u8], token: &[u8]) -> bool {
    match payload.strip_prefix(token) {
        Some(rest) => rest.first().map_or(true, |b| b.is_ascii_whitespace()),
        None => false,
    }
}

/// Returns the payload after the header line introduced by `token`, if present.
pub(crate) fn strip_header<'a>(payload: &'a [u8], token: &[u8]) -> Option<&'a [u8]> {
    if !has_header(payload, token) {
        return None;
    }

    let rest = &payload[token.len()..];
    match rest.iter().position(|&b| b == b'\n') {
        Some(pos) => Some(&rest[pos + 1..]),
        None => Some(&rest[rest.len()..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_status_response() {
        assert_eq!(route(b"statusResponse\n\\mapname\\q3dm6\n"), Channel::Status);
        assert_eq!(route(b"statusResponse"), Channel::Status);
    }

    #[test]
    fn test_route_print() {
        assert_eq!(route(b"print\nmap: q3dm6\n"), Channel::Console);
    }

    #[test]
    fn test_route_unknown_shape_goes_to_console() {
        assert_eq!(route(b"infoResponse\n\\hostname\\x"), Channel::Console);
        assert_eq!(route(b""), Channel::Console);
        assert_eq!(route(b"statusResponseX\n"), Channel::Console);
    }

    #[test]
    fn test_strip_header() {
        assert_eq!(
            strip_header(b"print\nline one\n", PRINT_HEADER),
            Some(&b"line one\n"[..])
        );
        assert_eq!(strip_header(b"print", PRINT_HEADER), Some(&b""[..]));
        assert_eq!(strip_header(b"line one\n", PRINT_HEADER), None);
    }
}
