//! Remote console commands.

use crate::error::ClientError;
use crate::transport::Transport;
use protocol::{remove_colors, Output, OutputParser, Request};
use std::fmt;

/// Replaces the rcon password wherever it would otherwise be logged.
pub const REDACTED: &str = "********";

/// Sends `rcon <password> <command>` and parses console replies.
///
/// The password is only ever written to the socket. Anything destined for a
/// log goes through [`RconClient::redact`] first.
pub struct RconClient {
    transport: Transport,
    password: String,
}

impl RconClient {
    pub fn new(transport: Transport, password: impl Into<String>) -> Self {
        Self {
            transport,
            password: password.into(),
        }
    }

    pub async fn send(&self, command: &str) -> Result<(), ClientError> {
        let request = Request::Rcon {
            password: &self.password,
            command,
        };
        self.transport.send(request.payload().as_bytes()).await
    }

    /// Returns `text` with the password masked.
    ///
    /// Only whole words and whole quoted strings equal to the password are
    /// masked, ignoring color escapes, so `map q3dm6` stays intact even with a
    /// one-letter password. A password containing whitespace or quotes can
    /// never form a single token and is masked wherever it occurs.
    pub fn redact(&self, text: &str) -> String {
        if self.password.is_empty() {
            return text.to_string();
        }
        if self.password.contains(|c: char| c == '"' || c.is_whitespace()) {
            return text.replace(&self.password, REDACTED);
        }

        let mut redacted = String::with_capacity(text.len());
        for token in tokens(text) {
            match token.strip_prefix('"') {
                Some(inner) => {
                    let (inner, close) = match inner.strip_suffix('"') {
                        Some(inner) => (inner, "\""),
                        None => (inner, ""),
                    };
                    if self.is_password(inner) {
                        redacted.push('"');
                        redacted.push_str(REDACTED);
                        redacted.push_str(close);
                    } else {
                        redacted.push_str(token);
                    }
                }
                None if self.is_password(token) => redacted.push_str(REDACTED),
                None => redacted.push_str(token),
            }
        }
        redacted
    }

    fn is_password(&self, token: &str) -> bool {
        token == self.password || remove_colors(token) == self.password
    }

    pub fn handle_response(&self, payload: &[u8]) -> Vec<Output> {
        OutputParser::parse(payload)
    }
}

/// Splits `text` into whitespace runs, quoted strings and bare words, in order.
/// Concatenating the pieces gives back `text`.
fn tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;

    while let Some(first) = rest.chars().next() {
        let len = if first == '"' {
            rest[1..].find('"').map_or(rest.len(), |close| close + 2)
        } else if first.is_whitespace() {
            rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len())
        } else {
            rest.find(|c: char| c == '"' || c.is_whitespace()).unwrap_or(rest.len())
        };

        let (token, tail) = rest.split_at(len);
        tokens.push(token);
        rest = tail;
    }

    tokens
}

impl fmt::Debug for RconClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RconClient")
            .field("transport", &self.transport)
            .field("password", &REDACTED)
            .finish()
    }
}
