//! Parsing of `getstatus` replies into server variables and a player list.
//!
//! A reply looks like this once the out-of-band marker is removed:
//!
//! ```text
//! statusResponse
//! \sv_hostname\^1Test^7Server\mapname\q3dm6\sv_maxclients\16
//! 12 48 "^2Player1"
//! 0 999 "Bot"
//! ```
//!
//! The first line after the header is the backslash-delimited info string,
//! every further line describes one connected player.

use crate::error::ProtocolError;
use crate::framing::{decode_text, strip_marker};
use crate::output::remove_colors;
use crate::route::{strip_header, STATUS_RESPONSE_HEADER};
use log::debug;
use std::collections::BTreeMap;

/// A connected player as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub score: i32,
    pub ping: i32,
    /// Name as sent by the server, color escapes included.
    pub name: String,
}

/// Snapshot of one status reply. Callers replace their view wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    pub variables: BTreeMap<String, String>,
    /// Players in the order the server listed them.
    pub players: Vec<Player>,
}

impl Status {
    /// Looks up a server variable; keys are case-sensitive.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// One-line title such as `Quake3Arena 1.32 [3/16] ~ 48 ms`.
    ///
    /// The ping suffix is omitted unless a positive round-trip time is known.
    pub fn title(&self, ping_ms: Option<u64>) -> String {
        let ping = match ping_ms {
            Some(ms) if ms > 0 => format!(" ~ {} ms", ms),
            _ => String::new(),
        };

        format!(
            "{} {} [{}/{}]{}",
            self.get("gamename").unwrap_or_default(),
            self.get("shortversion").unwrap_or_default(),
            self.players.len(),
            self.get("sv_maxclients").unwrap_or_default(),
            ping
        )
    }

    /// Map, game type and color-stripped host name, e.g. `q3dm6 (0) - TestServer`.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}) - {}",
            self.get("mapname").unwrap_or_default(),
            self.get("g_gametype").unwrap_or_default(),
            remove_colors(self.get("sv_hostname").unwrap_or_default())
        )
    }
}

/// Stateless parser for status replies.
pub struct StatusParser;

impl StatusParser {
    /// Parses an unframed status reply (a leading out-of-band marker is tolerated).
    ///
    /// Fails only when the payload is empty or lacks the `statusResponse`
    /// header. Malformed player lines are skipped.
    pub fn parse(raw: &[u8]) -> Result<Status, ProtocolError> {
        let payload = strip_marker(raw);
        if payload.is_empty() {
            return Err(ProtocolError::InvalidStatusPayload(
                "empty payload".to_string(),
            ));
        }

        let body = strip_header(payload, STATUS_RESPONSE_HEADER).ok_or_else(|| {
            ProtocolError::InvalidStatusPayload("missing statusResponse header".to_string())
        })?;
        let body = decode_text(body);

        let mut lines = body.split('\n').map(|line| line.trim_end_matches('\r'));
        let variables = lines.next().map(parse_variables).unwrap_or_default();

        let mut players = Vec::new();
        for line in lines.filter(|line| !line.trim().is_empty()) {
            match parse_player(line) {
                Ok(player) => players.push(player),
                Err(e) => debug!("Skipping player line: {}", e),
            }
        }

        Ok(Status { variables, players })
    }
}

/// Splits a `\key\value\key\value` info string into a map.
///
/// Tokens are paired in order; an odd trailing key without a value is dropped.
/// A repeated key keeps its last value.
pub fn parse_variables(info: &str) -> BTreeMap<String, String> {
    let info = info.strip_prefix('\\').unwrap_or(info);
    let mut variables = BTreeMap::new();
    if info.is_empty() {
        return variables;
    }

    let mut tokens = info.split('\\');
    while let (Some(key), Some(value)) = (tokens.next(), tokens.next()) {
        variables.insert(key.to_string(), value.to_string());
    }

    variables
}

/// Parses one `score ping "name"` line.
pub fn parse_player(line: &str) -> Result<Player, ProtocolError> {
    let unparseable = || ProtocolError::UnparseablePlayerLine(line.to_string());

    let (score, rest) = next_token(line).ok_or_else(unparseable)?;
    let (ping, rest) = next_token(rest).ok_or_else(unparseable)?;
    let score = score.parse::<i32>().map_err(|_| unparseable())?;
    let ping = ping.parse::<i32>().map_err(|_| unparseable())?;

    let quoted = rest.trim();
    let name = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(unparseable)?;

    Ok(Player {
        score,
        ping,
        name: name.to_string(),
    })
}

fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }

    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}
