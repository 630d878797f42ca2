use std::io::{ErrorKind, Read};

use bytes::{Buf, Bytes, BytesMut};
use stripctl_transport::StripStream;
use tracing::trace;

use crate::codec::{scan_header, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete message bodies from any `Read` stream.
///
/// The header is consumed one byte at a time so a malformed prefix is
/// rejected as soon as the offending byte arrives and no bytes belonging to
/// a following message are ever buffered. Body bytes are then read in
/// chunks no larger than what the header declared.
///
/// Partial reads are absorbed. A read that fails with a timeout leaves the
/// buffered bytes in place, so `read_message` can simply be called again.
pub struct MessageReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> MessageReader<T> {
    /// Create a new message reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new message reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete message body (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` on EOF between messages
    /// and `Err(FrameError::Truncated)` on EOF inside one.
    pub fn read_message(&mut self) -> Result<Bytes> {
        loop {
            let header = scan_header(&self.buf)?;

            let want = match header {
                None => 1,
                Some(header) => {
                    if header.body_len > self.config.max_body_size {
                        return Err(FrameError::BodyTooLarge {
                            size: header.body_len,
                            max: self.config.max_body_size,
                        });
                    }

                    let expected = header.message_len();
                    if self.buf.len() > expected {
                        return Err(FrameError::LengthOverrun {
                            received: self.buf.len(),
                            expected,
                        });
                    }
                    if self.buf.len() == expected {
                        self.buf.advance(header.header_len);
                        let body = self.buf.split_to(header.body_len).freeze();
                        trace!(len = body.len(), "read message");
                        return Ok(body);
                    }

                    let remaining = expected - self.buf.len();
                    self.buf.reserve(remaining);
                    remaining.min(READ_CHUNK_SIZE)
                }
            };

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk[..want]) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Err(FrameError::ConnectionClosed);
                }
                return Err(FrameError::Truncated {
                    received: self.buf.len(),
                });
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Whether part of a message has been received but not yet returned.
    pub fn has_partial_message(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl MessageReader<StripStream> {
    /// Create a reader for a `StripStream` and apply the read timeout from config.
    pub fn with_config_stream(inner: StripStream, config: FrameConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
