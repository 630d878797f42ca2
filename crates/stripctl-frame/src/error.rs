/// Errors that can occur during message encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The header does not match `Content-Length: <1-7 digits>\r\n\r\n`.
    #[error("invalid message header: {0}")]
    InvalidHeader(String),

    /// The declared or actual body exceeds the configured maximum size.
    #[error("message body too large ({size} bytes, max {max})")]
    BodyTooLarge { size: usize, max: usize },

    /// More bytes were accumulated than the header declared.
    #[error("message overran its declared length ({received} bytes, expected {expected})")]
    LengthOverrun { received: usize, expected: usize },

    /// An I/O error occurred while reading or writing messages.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before a message started.
    #[error("connection closed")]
    ConnectionClosed,

    /// The connection was closed part-way through a message.
    #[error("connection closed mid-message ({received} bytes received)")]
    Truncated { received: usize },
}

impl FrameError {
    /// Whether the error is a protocol violation by the peer, as opposed to a
    /// transport failure.
    pub fn is_framing(&self) -> bool {
        matches!(
            self,
            FrameError::InvalidHeader(_)
                | FrameError::BodyTooLarge { .. }
                | FrameError::LengthOverrun { .. }
        )
    }

    /// Whether the error is a read/write timeout that can be retried.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FrameError::Io(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                )
        )
    }
}

impl From<stripctl_transport::TransportError> for FrameError {
    fn from(err: stripctl_transport::TransportError) -> Self {
        FrameError::Io(err.into_io())
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
