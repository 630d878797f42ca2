use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::StripStream;

/// TCP listener transport.
///
/// Provides bind/accept/connect over TCP. The listener can be switched to
/// non-blocking mode so an accept loop can poll a shutdown flag between
/// attempts.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on `addr` (e.g. `0.0.0.0:8000`, `127.0.0.1:0`).
    pub fn bind(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<Self> {
        let label = addr.to_string();
        let listener = TcpListener::bind(&addr).map_err(|e| TransportError::Bind {
            addr: label.clone(),
            source: e,
        })?;
        let local_addr = listener.local_addr().map_err(|e| TransportError::Bind {
            addr: label,
            source: e,
        })?;

        info!(%local_addr, "listening on tcp");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Switch accept between blocking and non-blocking mode.
    pub fn set_nonblocking(&self, nonblocking: bool) -> Result<()> {
        self.listener
            .set_nonblocking(nonblocking)
            .map_err(TransportError::Io)
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<StripStream> {
        let (stream, addr) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%addr, "accepted connection");
        Ok(StripStream::from_tcp(stream))
    }

    /// Accept an incoming connection if one is pending.
    ///
    /// Returns `Ok(None)` when the listener is non-blocking and nobody is
    /// waiting. The accepted stream is always returned in blocking mode.
    pub fn try_accept(&self) -> Result<Option<StripStream>> {
        match self.listener.accept() {
            Ok((stream, addr)) => {
                stream.set_nonblocking(false)?;
                debug!(%addr, "accepted connection");
                Ok(Some(StripStream::from_tcp(stream)))
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(err) if err.kind() == ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(TransportError::Accept(err)),
        }
    }

    /// Connect to a listening server (blocking).
    pub fn connect(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<StripStream> {
        let label = addr.to_string();
        let stream = TcpStream::connect(&addr).map_err(|e| TransportError::Connect {
            addr: label.clone(),
            source: e,
        })?;
        debug!(addr = %label, "connected to server");
        Ok(StripStream::from_tcp(stream))
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
