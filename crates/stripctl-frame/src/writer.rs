use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use stripctl_transport::StripStream;
use tracing::trace;

use crate::codec::{encode_message, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete messages to any `Write` stream.
pub struct MessageWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> MessageWriter<T> {
    /// Create a new message writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new message writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Frame and send one message body (blocking).
    ///
    /// Partial writes are retried until the whole message is out.
    pub fn send(&mut self, body: &[u8]) -> Result<()> {
        self.send_until(body, || true)
    }

    /// Like [`send`](Self::send), but a write timeout is not fatal by
    /// itself: after each one `give_up` decides whether to return the
    /// timeout or keep writing. Bytes already written are never resent.
    pub fn send_until(&mut self, body: &[u8], mut give_up: impl FnMut() -> bool) -> Result<()> {
        if body.len() > self.config.max_body_size {
            return Err(FrameError::BodyTooLarge {
                size: body.len(),
                max: self.config.max_body_size,
            });
        }

        self.buf.clear();
        encode_message(body, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if self.retry_would_block(&err) => continue,
                Err(err) if is_timeout(&err) && !give_up() => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        trace!(len = body.len(), "sent message");
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if self.retry_would_block(&err) => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    // With a write timeout set, WouldBlock means the timeout expired.
    fn retry_would_block(&self, err: &std::io::Error) -> bool {
        err.kind() == ErrorKind::WouldBlock && self.config.write_timeout.is_none()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

impl MessageWriter<StripStream> {
    /// Create a writer for a `StripStream` and apply the write timeout from config.
    pub fn with_config_stream(inner: StripStream, config: FrameConfig) -> Result<Self> {
        inner.set_write_timeout(config.write_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
