//! `getstatus` polling.

use crate::error::ClientError;
use crate::transport::Transport;
use protocol::{ProtocolError, Request, Status, StatusParser};
use std::time::{Duration, Instant};

/// Sends `getstatus` requests and turns replies into [`Status`] values.
///
/// Also measures the round trip between the latest request and the next
/// status reply, which is what the title bar shows as ping.
#[derive(Debug)]
pub struct QueryClient {
    transport: Transport,
    last_sent: Option<Instant>,
    ping: Option<Duration>,
}

impl QueryClient {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            last_sent: None,
            ping: None,
        }
    }

    pub async fn send(&mut self) -> Result<(), ClientError> {
        self.transport
            .send(Request::GetStatus.payload().as_bytes())
            .await?;
        self.last_sent = Some(Instant::now());
        Ok(())
    }

    /// Parses a status reply and updates the round-trip measurement.
    pub fn handle_response(
        &mut self,
        payload: &[u8],
        received_at: Instant,
    ) -> Result<Status, ProtocolError> {
        let status = StatusParser::parse(payload)?;
        if let Some(sent) = self.last_sent.take() {
            self.ping = Some(received_at.saturating_duration_since(sent));
        }
        Ok(status)
    }

    /// Round trip of the most recent answered poll.
    pub fn ping(&self) -> Option<Duration> {
        self.ping
    }

    pub fn ping_ms(&self) -> Option<u64> {
        self.ping.map(|ping| ping.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Server;
    use std::net::UdpSocket as StdUdpSocket;
    use tokio_test::{assert_err, assert_ok};

    async fn client_with_peer() -> (QueryClient, StdUdpSocket) {
        let server_socket = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        server_socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let port = server_socket.local_addr().unwrap().port();
        let transport = Transport::connect(&Server::new("127.0.0.1", port))
            .await
            .unwrap();
        (QueryClient::new(transport), server_socket)
    }

    #[tokio::test]
    async fn test_send_getstatus() {
        let (mut query, server_socket) = client_with_peer().await;
        query.send().await.unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = server_socket.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[4..len], b"getstatus");
    }

    #[tokio::test]
    async fn test_ping_measured_from_last_send() {
        let (mut query, _server_socket) = client_with_peer().await;
        assert_eq!(query.ping(), None);

        query.send().await.unwrap();
        let received_at = Instant::now() + Duration::from_millis(40);
        let status = query
            .handle_response(b"statusResponse\n\\mapname\\q3dm6\n", received_at)
            .unwrap();

        assert_eq!(status.get("mapname"), Some("q3dm6"));
        assert!(query.ping_ms().unwrap() >= 40);
    }

    #[tokio::test]
    async fn test_invalid_reply_keeps_previous_ping() {
        let (mut query, _server_socket) = client_with_peer().await;
        assert_ok!(query.send().await);

        let err = assert_err!(query.handle_response(b"", Instant::now()));
        assert!(matches!(err, ProtocolError::InvalidStatusPayload(_)));
        assert_eq!(query.ping(), None);
    }
}
