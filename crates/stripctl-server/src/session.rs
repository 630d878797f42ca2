use std::io::Read;
use std::time::{Duration, Instant};

use stripctl_command::{Dispatcher, Response};
use stripctl_frame::{FrameConfig, FrameError, MessageReader, MessageWriter};
use stripctl_strip::Controller;
use stripctl_transport::StripStream;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::shutdown::ShutdownSignal;

/// Upper bound on input discarded after a framing error.
const MAX_DRAIN: usize = 64 * 1024;

/// Sent if a response envelope cannot be serialized.
const INTERNAL_ERROR_BODY: &[u8] = br#"{"status":500,"message":"Internal Server Error","result":{"error":"EXECUTION_ERROR","code":3},"description":"failed to encode response"}"#;

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client sent `disconnect` and it was acknowledged.
    Disconnected,
    /// The client closed its end of the connection.
    ClientClosed,
    /// The client sent something that is not a valid message.
    Framing,
    /// The connection failed underneath us.
    Transport,
    /// The server is shutting down.
    Shutdown,
}

/// Session-scoped settings.
#[derive(Debug, Clone)]
pub(crate) struct SessionConfig {
    pub frame: FrameConfig,
    /// Read timeout between shutdown checks.
    pub poll_interval: Duration,
}

/// Serve one connected client until it leaves, misbehaves or the server stops.
///
/// Only setting up the stream can fail; everything after that is reported
/// as a [`SessionEnd`]. The socket is closed on every path.
pub(crate) fn run_session(
    stream: StripStream,
    dispatcher: &Dispatcher,
    controller: &mut Controller,
    config: &SessionConfig,
    shutdown: &ShutdownSignal,
) -> Result<SessionEnd> {
    let peer = stream.peer_addr();
    let _ = stream.set_nodelay(true);

    // Both directions wake up every poll interval to check for shutdown.
    let frame_config = FrameConfig {
        read_timeout: Some(config.poll_interval),
        write_timeout: Some(config.poll_interval),
        ..config.frame.clone()
    };
    let mut reader = MessageReader::with_config_stream(stream.try_clone()?, frame_config.clone())?;
    let mut writer = MessageWriter::with_config_stream(stream, frame_config)?;

    info!(peer = ?peer, "session started");

    let end = loop {
        if shutdown.is_triggered() {
            let _ = writer.flush();
            info!(peer = ?peer, "closing session for shutdown");
            break SessionEnd::Shutdown;
        }

        let body = match reader.read_message() {
            Ok(body) => body,
            Err(err) if err.is_timeout() => continue,
            Err(FrameError::ConnectionClosed) => {
                info!(peer = ?peer, "client closed connection");
                break SessionEnd::ClientClosed;
            }
            Err(err @ FrameError::Truncated { .. }) => {
                info!(peer = ?peer, error = %err, "client dropped mid-message");
                break SessionEnd::ClientClosed;
            }
            Err(err) if err.is_framing() => {
                warn!(peer = ?peer, error = %err, "framing error, closing session");
                let reply = encode(&Response::framing_error(err.to_string()));
                if let Err(send_err) = writer.send(&reply) {
                    debug!(error = %send_err, "could not report framing error");
                }
                linger(&mut reader, writer.get_ref(), config.poll_interval);
                break SessionEnd::Framing;
            }
            Err(err) => {
                info!(peer = ?peer, error = %err, "connection lost");
                break SessionEnd::Transport;
            }
        };

        let dispatched = dispatcher.dispatch(&body, controller);
        debug!(status = dispatched.response.status, "response ready");

        let reply = encode(&dispatched.response);
        if let Err(err) = writer.send_until(&reply, || shutdown.is_triggered()) {
            if shutdown.is_triggered() {
                info!(peer = ?peer, "closing stalled session for shutdown");
                break SessionEnd::Shutdown;
            }
            info!(peer = ?peer, error = %err, "failed to send response");
            break SessionEnd::Transport;
        }

        if dispatched.disconnect {
            info!(peer = ?peer, "client disconnected");
            break SessionEnd::Disconnected;
        }
    };

    writer.get_ref().close();
    Ok(end)
}

/// Half-close and discard what the client already sent, so closing the
/// socket does not reset the connection before the reply is read.
fn linger(reader: &mut MessageReader<StripStream>, stream: &StripStream, window: Duration) {
    if stream.shutdown_write().is_err() {
        return;
    }
    let deadline = Instant::now() + window;
    let mut scratch = [0u8; 1024];
    let mut drained = 0;
    while drained < MAX_DRAIN && Instant::now() < deadline {
        match reader.get_mut().read(&mut scratch) {
            Ok(0) | Err(_) => break,
            Ok(n) => drained += n,
        }
    }
    debug!(drained, "drained input after framing error");
}

fn encode(response: &Response) -> Vec<u8> {
    response.to_bytes().unwrap_or_else(|err| {
        error!(error = %err, "failed to encode response");
        INTERNAL_ERROR_BODY.to_vec()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_body_is_an_internal_error_envelope() {
        let response = Response::from_bytes(INTERNAL_ERROR_BODY).unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.error_name(), Some("EXECUTION_ERROR"));
    }
}
