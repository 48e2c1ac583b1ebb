//! UDP transport: one socket, one peer, framed sends and a receiver task.

use crate::error::ClientError;
use log::{debug, error, warn};
use protocol::framing::{frame, unframe};
use protocol::{route, Channel, Server};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::{lookup_host, UdpSocket};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Largest payload a UDP datagram can carry.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// An unframed, routed datagram from the server.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub channel: Channel,
    pub payload: Vec<u8>,
    pub received_at: Instant,
}

/// Socket bound to an ephemeral local port that talks to a single server.
///
/// Cloning shares the socket; the socket closes when the last clone and the
/// receiver task are gone.
#[derive(Debug, Clone)]
pub struct Transport {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl Transport {
    /// Resolves `server` and binds a local socket of the matching family.
    pub async fn connect(server: &Server) -> Result<Self, ClientError> {
        let peer = lookup_host((server.host(), server.port()))
            .await?
            .next()
            .ok_or_else(|| ClientError::Resolve(server.to_string()))?;

        let local = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).await?;
        debug!("Bound {} for server {}", socket.local_addr()?, peer);

        Ok(Self {
            socket: Arc::new(socket),
            peer,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ClientError> {
        Ok(self.socket.local_addr()?)
    }

    /// Frames `payload` and sends it as one datagram to the server.
    pub async fn send(&self, payload: &[u8]) -> Result<(), ClientError> {
        let datagram = frame(payload);
        self.socket.send_to(&datagram, self.peer).await?;
        Ok(())
    }

    /// Spawns a task that forwards every well-formed datagram to `inbound_tx`.
    ///
    /// Malformed datagrams are logged and dropped. The task ends when the
    /// receiving side of the channel is closed or the handle is aborted.
    pub fn spawn_receiver(&self, inbound_tx: mpsc::UnboundedSender<Inbound>) -> JoinHandle<()> {
        let socket = Arc::clone(&self.socket);

        tokio::spawn(async move {
            let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        let Some(inbound) = demux(&buffer[..len], Instant::now()) else {
                            warn!("Dropping malformed datagram ({} bytes) from {}", len, addr);
                            continue;
                        };

                        if inbound_tx.send(inbound).is_err() {
                            debug!("Inbound channel closed, stopping receiver");
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Error receiving datagram: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        })
    }
}

/// Unframes and routes one datagram. Returns `None` for malformed frames.
pub fn demux(datagram: &[u8], received_at: Instant) -> Option<Inbound> {
    let payload = unframe(datagram).ok()?;
    Some(Inbound {
        channel: route(payload),
        payload: payload.to_vec(),
        received_at,
    })
}
