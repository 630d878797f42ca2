use std::net::SocketAddr;
use std::thread;
use std::time::Duration;

use stripctl_command::Dispatcher;
use stripctl_frame::FrameConfig;
use stripctl_schema::RegistryConfig;
use stripctl_strip::Controller;
use stripctl_transport::TcpTransport;
use tracing::{info, warn};

use crate::error::Result;
use crate::session::{run_session, SessionConfig, SessionEnd};
use crate::shutdown::ShutdownSignal;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Longest pause between accept attempts while idle.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    pub addr: String,
    pub frame: FrameConfig,
    /// How often a blocked session read checks for shutdown.
    pub poll_interval: Duration,
    pub registry: RegistryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            frame: FrameConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            registry: RegistryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Listening,
    SessionActive,
    Closed,
}

/// Serial control server: one session at a time, all against one controller.
pub struct StripServer {
    transport: TcpTransport,
    dispatcher: Dispatcher,
    controller: Controller,
    session: SessionConfig,
    shutdown: ShutdownSignal,
    state: ServerState,
    sessions: u64,
}

impl StripServer {
    /// Compile the command schemas and bind the listener.
    pub fn bind(config: ServerConfig, controller: Controller) -> Result<Self> {
        let dispatcher = Dispatcher::new(config.registry)?;
        let transport = TcpTransport::bind(config.addr.as_str())?;
        transport.set_nonblocking(true)?;

        Ok(Self {
            transport,
            dispatcher,
            controller,
            session: SessionConfig {
                frame: config.frame,
                poll_interval: config.poll_interval,
            },
            shutdown: ShutdownSignal::new(),
            state: ServerState::Idle,
            sessions: 0,
        })
    }

    /// Use an externally owned shutdown signal.
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Handle that stops [`serve`](Self::serve) when triggered.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Number of sessions served so far.
    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn into_controller(self) -> Controller {
        self.controller
    }

    /// Accept and serve clients until shutdown.
    pub fn serve(&mut self) -> Result<()> {
        info!(addr = %self.local_addr(), "server started");
        while self.serve_one()?.is_some() {}
        info!(sessions = self.sessions, "server stopped");
        Ok(())
    }

    /// Wait for the next client and serve it to completion.
    ///
    /// Returns `None` once shutdown has been requested.
    pub fn serve_one(&mut self) -> Result<Option<SessionEnd>> {
        self.state = ServerState::Listening;
        let idle_pause = self.session.poll_interval.min(ACCEPT_BACKOFF);

        loop {
            if self.shutdown.is_triggered() {
                self.state = ServerState::Closed;
                return Ok(None);
            }

            let stream = match self.transport.try_accept() {
                Ok(Some(stream)) => stream,
                Ok(None) => {
                    thread::sleep(idle_pause);
                    continue;
                }
                Err(err) => {
                    warn!(error = %err, kind = ?err.kind(), "accept failed");
                    thread::sleep(idle_pause);
                    continue;
                }
            };

            self.state = ServerState::SessionActive;
            let end = run_session(
                stream,
                &self.dispatcher,
                &mut self.controller,
                &self.session,
                &self.shutdown,
            );
            self.sessions += 1;
            self.state = ServerState::Idle;

            match end {
                Ok(end) => {
                    info!(?end, "session ended");
                    return Ok(Some(end));
                }
                Err(err) => warn!(error = %err, "session setup failed"),
            }
        }
    }
}

impl std::fmt::Debug for StripServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripServer")
            .field("addr", &self.transport.local_addr())
            .field("state", &self.state)
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::sync::mpsc;
    use std::thread::JoinHandle;

    use serde_json::json;
    use stripctl_frame::{FrameError, MessageReader, MessageWriter};
    use stripctl_strip::{Color, MemorySink, StripStatus};

    use super::*;
    use crate::client::Client;

    struct Running {
        addr: SocketAddr,
        shutdown: ShutdownSignal,
        handle: JoinHandle<(ServerState, u64, StripStatus)>,
    }

    impl Running {
        fn stop(self) -> (ServerState, u64, StripStatus) {
            self.shutdown.trigger();
            self.handle.join().unwrap()
        }
    }

    fn start(strip_length: usize) -> Running {
        start_with(strip_length, |_| {})
    }

    fn start_with(
        strip_length: usize,
        setup: impl FnOnce(&mut Controller) + Send + 'static,
    ) -> Running {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let mut controller =
                Controller::new(strip_length, Box::new(MemorySink::new())).unwrap();
            setup(&mut controller);
            let config = ServerConfig {
                addr: "127.0.0.1:0".to_string(),
                poll_interval: Duration::from_millis(20),
                ..ServerConfig::default()
            };
            let mut server = StripServer::bind(config, controller).unwrap();
            tx.send((server.local_addr(), server.shutdown_signal()))
                .unwrap();
            server.serve().unwrap();
            (
                server.state(),
                server.sessions(),
                server.controller().status(),
            )
        });
        let (addr, shutdown) = rx.recv().unwrap();
        Running {
            addr,
            shutdown,
            handle,
        }
    }

    #[test]
    fn commands_round_trip_over_tcp() {
        let running = start(300);
        let mut client = Client::connect(running.addr).unwrap();

        let created = client
            .request(
                "new_section",
                Some(json!({"start": 0, "end": 99, "color": "#ff0000"})),
            )
            .unwrap();
        assert_eq!(created.status, 200);

        let overlap = client
            .request(
                "new_section",
                Some(json!({"start": 50, "end": 150, "color": "#ff0000"})),
            )
            .unwrap();
        assert_eq!(overlap.status, 409);

        let status = client.request("status", None).unwrap();
        assert_eq!(status.result.unwrap()["sections"].as_array().unwrap().len(), 1);

        client.close();
        let (state, _, strip) = running.stop();
        assert_eq!(state, ServerState::Closed);
        assert_eq!(strip.sections.len(), 1);
        assert_eq!(strip.sections[0].color, Color::new(255, 0, 0));
    }

    #[test]
    fn disconnect_is_acknowledged_then_closed() {
        let running = start(10);
        let mut client = Client::connect(running.addr).unwrap();

        let response = client.request("disconnect", None).unwrap();
        assert_eq!(response.status, 202);

        let err = client.recv().unwrap_err();
        assert!(matches!(
            err,
            crate::error::ClientError::Frame(FrameError::ConnectionClosed)
        ));

        let (_, sessions, _) = running.stop();
        assert_eq!(sessions, 1);
    }

    #[test]
    fn bad_header_ends_session_but_not_server() {
        let running = start(10);

        let mut raw = TcpStream::connect(running.addr).unwrap();
        raw.write_all(b"Content-Length: abc\r\n\r\n{}").unwrap();
        let mut reader = MessageReader::new(raw.try_clone().unwrap());
        let reply: stripctl_command::Response =
            serde_json::from_slice(&reader.read_message().unwrap()).unwrap();
        assert_eq!(reply.status, 400);
        assert_eq!(reply.error_name(), Some("BAD_REQUEST"));

        let mut rest = Vec::new();
        assert_eq!(raw.read_to_end(&mut rest).unwrap(), 0);

        let mut next = Client::connect(running.addr).unwrap();
        assert_eq!(next.request("status", None).unwrap().status, 200);
        next.close();

        running.stop();
    }

    #[test]
    fn abrupt_close_frees_the_server() {
        let running = start(10);

        drop(TcpStream::connect(running.addr).unwrap());

        let mut next = Client::connect(running.addr).unwrap();
        let response = next.request("turn_off", None).unwrap();
        assert_eq!(response.status, 200);
        next.close();

        let (_, _, strip) = running.stop();
        assert!(!strip.is_on);
    }

    #[test]
    fn shutdown_closes_active_session() {
        let running = start(10);
        let mut client = Client::connect(running.addr).unwrap();
        assert_eq!(client.request("status", None).unwrap().status, 200);

        let (state, sessions, _) = running.stop();
        assert_eq!(state, ServerState::Closed);
        assert_eq!(sessions, 1);

        assert!(client.recv().is_err());
    }

    #[test]
    fn shutdown_unblocks_client_that_never_reads() {
        // Every status reply is large, so unread replies fill the socket
        // buffers and the server blocks writing.
        let running = start_with(5000, |ctl| {
            for pixel in 0..5000 {
                ctl.new_section(pixel, pixel, Color::new(255, 0, 0)).unwrap();
            }
        });

        let raw = TcpStream::connect(running.addr).unwrap();
        let mut writer = MessageWriter::new(raw.try_clone().unwrap());
        for _ in 0..64 {
            writer.send(br#"{"command":"status"}"#).unwrap();
        }
        thread::sleep(Duration::from_millis(300));

        let (state, sessions, strip) = running.stop();
        assert_eq!(state, ServerState::Closed);
        assert_eq!(sessions, 1);
        assert_eq!(strip.sections.len(), 5000);
        drop(raw);
    }

    #[test]
    fn shutdown_while_idle() {
        let running = start(10);
        let (state, sessions, _) = running.stop();
        assert_eq!(state, ServerState::Closed);
        assert_eq!(sessions, 0);
    }
}
