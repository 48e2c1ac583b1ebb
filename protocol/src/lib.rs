//! # Out-of-band Protocol Library
//!
//! Pure, I/O-free building blocks for talking to Quake III style game servers
//! over their connectionless UDP protocol. Everything here operates on byte
//! slices and plain values so the network client and tests can share it.
//!
//! ## Wire Format
//!
//! Every datagram in either direction starts with four `0xFF` bytes followed
//! by an ASCII verb or header token:
//!
//! - `getstatus` asks for the server's variables and player list; the reply
//!   starts with `statusResponse`.
//! - `rcon <password> <command>` runs an administrative command; the reply
//!   starts with `print` and carries console text.
//!
//! ## Module Organization
//!
//! - `framing`: adds and removes the out-of-band marker
//! - `route`: decides whether a reply is a status or console payload
//! - `status`: parses status replies into a [`Status`]
//! - `output`: parses console replies into colored [`Output`] lines
//! - `gate`: the one-command-per-interval throttle
//!
//! ## Usage Example
//!
//! ```rust
//! use protocol::{framing, route, Channel, OutputParser, Request, StatusParser};
//!
//! let datagram = Request::GetStatus.encode();
//! assert_eq!(&datagram[4..], b"getstatus");
//!
//! let reply = framing::frame(b"statusResponse\n\\mapname\\q3dm6\n0 50 \"^1Bob\"\n");
//! let payload = framing::unframe(&reply).unwrap();
//! assert_eq!(route(payload), Channel::Status);
//!
//! let status = StatusParser::parse(payload).unwrap();
//! assert_eq!(status.get("mapname"), Some("q3dm6"));
//! assert_eq!(protocol::remove_colors(&status.players[0].name), "Bob");
//!
//! let lines = OutputParser::parse(b"print\n^2Player1^7 was kicked\n");
//! assert_eq!(lines[0].to_plain_text(), "Player1 was kicked");
//! ```

pub mod error;
pub mod framing;
pub mod gate;
pub mod output;
pub mod route;
pub mod status;

pub use error::ProtocolError;
pub use gate::{CommandGate, DEFAULT_MIN_INTERVAL};
pub use output::{remove_colors, Color, Output, OutputParser, Run};
pub use route::{route, Channel};
pub use status::{Player, Status, StatusParser};

use std::fmt;
use std::str::FromStr;

/// Port used when an address does not name one.
pub const DEFAULT_PORT: u16 = 27960;

/// Address of the game server a session talks to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Server {
    host: String,
    port: u16,
}

impl Server {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Name of the transcript file for this server, e.g. `log_127.0.0.1_27960.log`.
    pub fn log_file_name(&self) -> String {
        format!("log_{}_{}.log", self.host, self.port)
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Server {
    type Err = ProtocolError;

    /// Accepts `host`, `host:port`, `[v6]` and `[v6]:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ProtocolError::InvalidServerAddress(s.to_string());
        let s = s.trim();

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or_else(invalid)?;
            match tail {
                "" => (host, None),
                _ => (host, Some(tail.strip_prefix(':').ok_or_else(invalid)?)),
            }
        } else {
            match s.split_once(':') {
                Some((host, port)) if !port.contains(':') => (host, Some(port)),
                // More than one colon: a bare IPv6 address.
                Some(_) => (s, None),
                None => (s, None),
            }
        };

        if host.is_empty() {
            return Err(invalid());
        }

        let port = match port {
            Some(port) => port.parse::<u16>().map_err(|_| invalid())?,
            None => DEFAULT_PORT,
        };

        Ok(Server::new(host, port))
    }
}

/// Outbound requests. Only these two verbs exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request<'a> {
    GetStatus,
    Rcon { password: &'a str, command: &'a str },
}

impl Request<'_> {
    /// Unframed request text.
    pub fn payload(&self) -> String {
        match self {
            Request::GetStatus => "getstatus".to_string(),
            Request::Rcon { password, command } => format!("rcon {} {}", password, command),
        }
    }

    /// Complete datagram including the out-of-band marker.
    pub fn encode(&self) -> Vec<u8> {
        framing::frame(self.payload().as_bytes())
    }
}
