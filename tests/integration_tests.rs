//! Integration tests for the protocol and client crates
//!
//! These tests validate cross-crate behavior against a fake server on a real
//! UDP socket.

use client::config::Preferences;
use client::session::{Session, SessionCommand, SessionEvent};
use protocol::framing::{frame, unframe};
use protocol::{
    remove_colors, route, Channel, Color, OutputParser, ProtocolError, Server, StatusParser,
};
use std::net::{SocketAddr, UdpSocket};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_test::{assert_err, assert_ok};

/// Minimal game server: answers `getstatus` and `rcon` like a real one would.
fn spawn_fake_server(password: &'static str) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("Failed to bind fake server");
    let addr = socket.local_addr().unwrap();

    thread::spawn(move || {
        let mut buf = [0u8; 2048];
        while let Ok((len, from)) = socket.recv_from(&mut buf) {
            let Ok(request) = unframe(&buf[..len]) else {
                continue;
            };
            let request = String::from_utf8_lossy(request).to_string();

            let reply: Vec<u8> = if request == "getstatus" {
                b"statusResponse\n\\sv_hostname\\^1Test^7Server\\mapname\\q3dm6\\sv_maxclients\\12\n\
                  10 32 \"^2Player1\"\n\
                  bogus line\n\
                  -1 999 \"Bot ^3Sarge\"\n"
                    .to_vec()
            } else if let Some(rest) = request.strip_prefix("rcon ") {
                match rest.split_once(' ') {
                    Some((pw, command)) if pw == password => {
                        format!("print\n^3executed:^7 {}\n^2Player1^7 was kicked\n", command)
                            .into_bytes()
                    }
                    _ => b"print\nBad rconpassword.\n".to_vec(),
                }
            } else {
                continue;
            };

            let _ = socket.send_to(&frame(&reply), from);
        }
    });

    addr
}

fn preferences() -> Preferences {
    Preferences {
        logging_enabled: false,
        getstatus_interval: 100,
        command_interval: 1000,
    }
}

async fn next_event(events: &mut mpsc::UnboundedReceiver<SessionEvent>) -> SessionEvent {
    timeout(Duration::from_secs(3), events.recv())
        .await
        .expect("timed out waiting for session event")
        .expect("session ended")
}

/// PROTOCOL TESTS
mod protocol_tests {
    use super::*;

    /// Tests the documented status scenario end to end through framing and routing
    #[test]
    fn status_scenario_through_framing() {
        let datagram = frame(b"statusResponse\n\\mapname\\q3dm6\\sv_hostname\\^1Test^7Server");
        let payload = assert_ok!(unframe(&datagram));
        assert_eq!(route(payload), Channel::Status);

        let status = assert_ok!(StatusParser::parse(payload));
        assert_eq!(status.variables.len(), 2);
        assert_eq!(status.get("mapname"), Some("q3dm6"));
        assert_eq!(remove_colors(status.get("sv_hostname").unwrap()), "TestServer");
    }

    /// Tests that a truncated datagram is reported as malformed
    #[test]
    fn truncated_datagram_is_malformed() {
        let err = assert_err!(unframe(&[0xFF, 0xFF, 0xFF]));
        assert_eq!(err, ProtocolError::MalformedFrame { len: 3 });
    }

    /// Tests console parsing of the kick scenario
    #[test]
    fn kick_scenario_runs() {
        let outputs = OutputParser::parse(&frame(b"print\n^2Player1^7 was kicked\n"));
        assert_eq!(outputs.len(), 1);

        let runs = outputs[0].runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "Player1");
        assert_eq!(runs[0].color, Some(Color::Green));
        assert_eq!(runs[1].text, " was kicked");
        assert_eq!(runs[1].color, None);
    }

    /// Tests variable and player counts for generated payloads
    #[test]
    fn variable_and_player_counts() {
        for pairs in 0..6 {
            for valid_players in 0..4 {
                let mut payload = String::from("statusResponse\n");
                for i in 0..pairs {
                    payload.push_str(&format!("\\key{}\\value{}", i, i));
                }
                payload.push('\n');
                for i in 0..valid_players {
                    payload.push_str(&format!("{} {} \"player {}\"\n", i, i * 10, i));
                    payload.push_str("not a player line\n");
                }

                let status = StatusParser::parse(payload.as_bytes()).unwrap();
                assert_eq!(status.variables.len(), pairs);
                assert_eq!(status.players.len(), valid_players);
            }
        }
    }
}

/// CLIENT-SERVER INTEGRATION TESTS
mod client_server_tests {
    use super::*;

    /// Tests the status poll loop against a fake server
    #[tokio::test]
    async fn status_poll_roundtrip() {
        let addr = spawn_fake_server("secret");
        let server = Server::new("127.0.0.1", addr.port());
        let session = Session::connect(server, "secret", preferences(), ".")
            .await
            .unwrap();

        let (_cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(session.run(cmd_rx, event_tx));

        loop {
            if let SessionEvent::Status { status, .. } = next_event(&mut event_rx).await {
                let names: Vec<&str> = status.players.iter().map(|p| p.name.as_str()).collect();
                assert_eq!(names, vec!["^2Player1", "Bot ^3Sarge"]);
                assert_eq!(status.summary(), "q3dm6 () - TestServer");
                assert!(status.title(None).ends_with("[2/12]"));
                break;
            }
        }

        handle.abort();
    }

    /// Tests rcon commands, console output and the command gate together
    #[tokio::test]
    async fn rcon_roundtrip_with_gate() {
        let addr = spawn_fake_server("secret");
        let server = Server::new("127.0.0.1", addr.port());
        let session = Session::connect(server, "secret", preferences(), ".")
            .await
            .unwrap();

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(session.run(cmd_rx, event_tx));

        // The automatic startup `status` is answered first.
        let mut console = Vec::new();
        while console.is_empty() {
            if let SessionEvent::Output(lines) = next_event(&mut event_rx).await {
                console = lines;
            }
        }
        assert_eq!(console[0].to_plain_text(), "executed: status");

        // Dropped: too soon after the startup command.
        cmd_tx
            .send(SessionCommand::Send("kick Player1".to_string()))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        cmd_tx.send(SessionCommand::ServerInfo).unwrap();

        let mut sent = Vec::new();
        loop {
            match next_event(&mut event_rx).await {
                SessionEvent::CommandSent(command) => sent.push(command),
                SessionEvent::Output(lines) => {
                    assert_eq!(lines[0].to_plain_text(), "executed: serverinfo");
                    break;
                }
                _ => {}
            }
        }
        assert_eq!(sent, vec!["serverinfo".to_string()]);

        cmd_tx.send(SessionCommand::Disconnect).unwrap();
        loop {
            if let SessionEvent::Closed = next_event(&mut event_rx).await {
                break;
            }
        }
        assert!(handle.await.unwrap().is_ok());
    }

    /// Tests that a wrong password yields the server's console message
    #[tokio::test]
    async fn wrong_password_reply() {
        let addr = spawn_fake_server("secret");
        let server = Server::new("127.0.0.1", addr.port());
        let session = Session::connect(server, "wrong", preferences(), ".")
            .await
            .unwrap();

        let (_cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(session.run(cmd_rx, event_tx));

        loop {
            if let SessionEvent::Output(lines) = next_event(&mut event_rx).await {
                assert_eq!(lines[0].to_plain_text(), "Bad rconpassword.");
                break;
            }
        }

        handle.abort();
    }
}
