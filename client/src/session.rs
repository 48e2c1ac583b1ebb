//! Connection session: the event loop tying transport, clients, gate and
//! transcript together.
//!
//! A session runs on a single task. It `select!`s over three sources:
//!
//! - the `getstatus` interval, which keeps firing regardless of pending
//!   rcon replies
//! - routed datagrams from the receiver task
//! - commands from the UI
//!
//! and reports results back to the UI as [`SessionEvent`]s. Closing the
//! session aborts the receiver task, which releases the socket, and stops the
//! status interval.

use crate::config::Preferences;
use crate::error::ClientError;
use crate::query::QueryClient;
use crate::rcon::RconClient;
use crate::transcript::TranscriptLogger;
use crate::transport::{Inbound, Transport};
use log::{debug, info, warn};
use protocol::{Channel, CommandGate, Output, Server, Status};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, interval_at, sleep, MissedTickBehavior};

/// Delay before the automatic `status` command after connecting.
pub const STARTUP_COMMAND_DELAY: Duration = Duration::from_millis(250);

pub const STATUS_COMMAND: &str = "status";
pub const SERVERINFO_COMMAND: &str = "serverinfo";

/// Requests from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Send a raw rcon command.
    Send(String),
    /// Shortcut for `status`.
    Status,
    /// Shortcut for `serverinfo`.
    ServerInfo,
    Disconnect,
}

/// Results handed to the UI.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A fresh status snapshot and the latest poll round trip.
    Status {
        status: Status,
        ping: Option<Duration>,
    },
    /// Console lines of one rcon reply.
    Output(Vec<Output>),
    /// A command passed the gate and was sent, password redacted.
    CommandSent(String),
    Closed,
}

pub struct Session {
    server: Server,
    preferences: Preferences,
    query: QueryClient,
    rcon: RconClient,
    gate: CommandGate,
    transcript: TranscriptLogger,
    inbound_rx: mpsc::UnboundedReceiver<Inbound>,
    receiver: JoinHandle<()>,
}

impl Session {
    /// Binds the transport, starts its receiver task and sets up the clients.
    pub async fn connect(
        server: Server,
        password: impl Into<String>,
        preferences: Preferences,
        log_dir: impl AsRef<Path>,
    ) -> Result<Self, ClientError> {
        let transport = Transport::connect(&server).await?;
        info!(
            "Session for {} on local {}",
            transport.peer_addr(),
            transport.local_addr()?
        );

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let receiver = transport.spawn_receiver(inbound_tx);

        let transcript = TranscriptLogger::new(log_dir, &server, preferences.logging_enabled);
        let gate = CommandGate::new(preferences.command_interval());

        Ok(Self {
            query: QueryClient::new(transport.clone()),
            rcon: RconClient::new(transport, password),
            server,
            preferences,
            gate,
            transcript,
            inbound_rx,
            receiver,
        })
    }

    pub fn server(&self) -> &Server {
        &self.server
    }

    pub fn transcript(&self) -> &TranscriptLogger {
        &self.transcript
    }

    /// Runs until the UI disconnects, drops its command sender, or drops its
    /// event receiver.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Result<(), ClientError> {
        // First poll after one full period, like every later one.
        let period = self.preferences.status_interval();
        let mut status_timer = interval_at(time::Instant::now() + period, period);
        status_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let startup = sleep(STARTUP_COMMAND_DELAY);
        tokio::pin!(startup);
        let mut startup_pending = true;

        loop {
            tokio::select! {
                _ = status_timer.tick() => {
                    if let Err(e) = self.query.send().await {
                        warn!("Failed to send getstatus: {}", e);
                    }
                },

                _ = &mut startup, if startup_pending => {
                    startup_pending = false;
                    if !self.issue(STATUS_COMMAND, Instant::now(), &events).await {
                        break;
                    }
                },

                inbound = self.inbound_rx.recv() => {
                    let Some(inbound) = inbound else {
                        warn!("Receiver for {} stopped", self.server);
                        break;
                    };
                    if !self.handle_inbound(inbound, &events) {
                        break;
                    }
                },

                command = commands.recv() => {
                    let command = match command {
                        Some(SessionCommand::Send(command)) => command,
                        Some(SessionCommand::Status) => STATUS_COMMAND.to_string(),
                        Some(SessionCommand::ServerInfo) => SERVERINFO_COMMAND.to_string(),
                        Some(SessionCommand::Disconnect) | None => break,
                    };
                    if !self.issue(&command, Instant::now(), &events).await {
                        break;
                    }
                },
            }
        }

        info!("Closing session for {}", self.server);
        let _ = events.send(SessionEvent::Closed);
        Ok(())
    }

    /// Sends `command` if the gate allows it at `now`, logging it first.
    ///
    /// Returns false once the UI has stopped listening.
    async fn issue(
        &mut self,
        command: &str,
        now: Instant,
        events: &mpsc::UnboundedSender<SessionEvent>,
    ) -> bool {
        let command = command.trim_end_matches(['\r', '\n']);
        if !self.gate.try_accept(now) {
            debug!(
                "Dropping command sent within {:?} of the previous one",
                self.gate.min_interval()
            );
            return true;
        }

        let redacted = self.rcon.redact(command);
        self.transcript.log_command(&redacted);

        if let Err(e) = self.rcon.send(command).await {
            warn!("Failed to send rcon command: {}", e);
        }

        events.send(SessionEvent::CommandSent(redacted)).is_ok()
    }

    /// Parses a routed datagram and forwards the result to the UI.
    ///
    /// Returns false once the UI has stopped listening.
    fn handle_inbound(
        &mut self,
        inbound: Inbound,
        events: &mpsc::UnboundedSender<SessionEvent>,
    ) -> bool {
        let event = match inbound.channel {
            Channel::Status => {
                match self
                    .query
                    .handle_response(&inbound.payload, inbound.received_at)
                {
                    Ok(status) => SessionEvent::Status {
                        status,
                        ping: self.query.ping(),
                    },
                    Err(e) => {
                        warn!("Status poll failed: {}", e);
                        return true;
                    }
                }
            }
            Channel::Console => {
                let outputs = self.rcon.handle_response(&inbound.payload);
                for output in &outputs {
                    let line = self.rcon.redact(&output.to_plain_text());
                    self.transcript.log_output(&line);
                }
                SessionEvent::Output(outputs)
            }
        };

        events.send(event).is_ok()
    }

    /// Aborts the receiver task and releases the socket.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.receiver.abort();
    }
}
