//! # Remote Administration Client Library
//!
//! Networked half of the remote console client. It owns the UDP socket,
//! polls server status, sends password-authenticated console commands, and
//! keeps a transcript of everything that was sent and printed.
//!
//! ## Architecture Overview
//!
//! ### Fire-and-Forget Protocol
//! Requests are single datagrams with no sequence number and no
//! acknowledgement. A lost request simply never gets an answer, so nothing
//! here retries or waits on a particular reply.
//!
//! ### Single Receive Path
//! One receiver task reads the socket, strips the out-of-band marker and
//! routes every payload by its header token. The session loop consumes the
//! routed payloads alongside its status timer and the UI's commands, so
//! status polling never stalls behind an outstanding console reply.
//!
//! ### Flood Protection
//! Console commands pass a fixed-window gate before they are sent. Commands
//! issued too soon after the previous one are dropped without an error.
//!
//! ## Module Organization
//!
//! - `transport`: socket ownership, framed sends, receiver task
//! - `query`: `getstatus` requests, status replies and ping
//! - `rcon`: `rcon` requests, console replies and password redaction
//! - `transcript`: the per-server log file
//! - `config`: preferences with their defaults
//! - `completion`: the command word list
//! - `session`: the event loop that ties it together
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::config::Preferences;
//! use client::session::{Session, SessionCommand, SessionEvent};
//! use protocol::Server;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server: Server = "127.0.0.1:27960".parse()?;
//!     let session = Session::connect(server, "secret", Preferences::default(), ".").await?;
//!
//!     let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
//!     let (event_tx, mut event_rx) = mpsc::unbounded_channel();
//!     tokio::spawn(session.run(cmd_rx, event_tx));
//!
//!     cmd_tx.send(SessionCommand::Send("map q3dm17".to_string()))?;
//!
//!     while let Some(event) = event_rx.recv().await {
//!         match event {
//!             SessionEvent::Output(lines) => {
//!                 for line in lines {
//!                     println!("{}", line.to_plain_text());
//!                 }
//!             }
//!             SessionEvent::Closed => break,
//!             _ => {}
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod completion;
pub mod config;
pub mod error;
pub mod query;
pub mod rcon;
pub mod session;
pub mod transcript;
pub mod transport;

pub use error::ClientError;
