use std::fmt::Display;
use std::net::{SocketAddr, ToSocketAddrs};

use serde_json::{json, Value};
use stripctl_command::Response;
use stripctl_frame::{FrameConfig, MessageReader, MessageWriter};
use stripctl_transport::{StripStream, TcpTransport};
use tracing::debug;

use crate::error::ClientError;

/// Blocking protocol client: one request, one response.
pub struct Client {
    reader: MessageReader<StripStream>,
    writer: MessageWriter<StripStream>,
}

impl Client {
    /// Connect with default framing limits and no timeouts.
    pub fn connect(addr: impl ToSocketAddrs + Display) -> Result<Self, ClientError> {
        Self::connect_with_config(addr, FrameConfig::default())
    }

    pub fn connect_with_config(
        addr: impl ToSocketAddrs + Display,
        config: FrameConfig,
    ) -> Result<Self, ClientError> {
        let stream = TcpTransport::connect(addr)?;
        let _ = stream.set_nodelay(true);
        let reader = MessageReader::with_config_stream(stream.try_clone()?, config.clone())?;
        let writer = MessageWriter::with_config_stream(stream, config)?;
        Ok(Self { reader, writer })
    }

    /// Send `{"command": command, "args": args}` and wait for the response.
    pub fn request(&mut self, command: &str, args: Option<Value>) -> Result<Response, ClientError> {
        let envelope = match args {
            Some(args) => json!({ "command": command, "args": args }),
            None => json!({ "command": command }),
        };
        debug!(command, "sending request");
        self.send_raw(&serde_json::to_vec(&envelope)?)
    }

    /// Send an arbitrary body and wait for the response.
    pub fn send_raw(&mut self, body: &[u8]) -> Result<Response, ClientError> {
        self.writer.send(body)?;
        self.recv()
    }

    /// Read the next response envelope.
    pub fn recv(&mut self) -> Result<Response, ClientError> {
        let body = self.reader.read_message()?;
        Ok(Response::from_bytes(&body)?)
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.writer.get_ref().peer_addr()
    }

    /// Close the connection without sending `disconnect`.
    pub fn close(self) {
        self.writer.get_ref().close();
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("peer", &self.peer_addr())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn request_frames_envelope() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr();

        let server = thread::spawn(move || {
            let stream = listener.accept().unwrap();
            let mut reader = MessageReader::new(stream.try_clone().unwrap());
            let mut writer = MessageWriter::new(stream);

            let request: Value = serde_json::from_slice(&reader.read_message().unwrap()).unwrap();
            let reply = Response::ok(Some(request)).to_bytes().unwrap();
            writer.send(&reply).unwrap();
        });

        let mut client = Client::connect(addr).unwrap();
        let response = client.request("reset", None).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.result, Some(json!({"command": "reset"})));

        server.join().unwrap();
    }

    #[test]
    fn non_envelope_reply_is_json_error() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr();

        let server = thread::spawn(move || {
            let stream = listener.accept().unwrap();
            let mut reader = MessageReader::new(stream.try_clone().unwrap());
            let mut writer = MessageWriter::new(stream);
            reader.read_message().unwrap();
            writer.send(b"[1, 2, 3]").unwrap();
        });

        let mut client = Client::connect(addr).unwrap();
        let err = client.send_raw(b"{}").unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));

        server.join().unwrap();
    }

    #[test]
    fn connect_refused() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr();
        drop(listener);

        assert!(matches!(
            Client::connect(addr),
            Err(ClientError::Transport(_))
        ));
    }
}
