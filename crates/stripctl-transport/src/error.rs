use std::io;

/// Errors raised by the TCP transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listener could not be bound to `addr`.
    #[error("failed to bind to {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    /// No connection could be made to `addr`.
    #[error("failed to connect to {addr}: {source}")]
    Connect { addr: String, source: io::Error },

    #[error("failed to accept connection: {0}")]
    Accept(io::Error),

    /// I/O on an established stream failed.
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Kind of the underlying I/O error.
    pub fn kind(&self) -> io::ErrorKind {
        self.source_io().kind()
    }

    /// Take the underlying I/O error, dropping the address context.
    pub fn into_io(self) -> io::Error {
        match self {
            TransportError::Bind { source, .. } | TransportError::Connect { source, .. } => source,
            TransportError::Accept(source) | TransportError::Io(source) => source,
        }
    }

    fn source_io(&self) -> &io::Error {
        match self {
            TransportError::Bind { source, .. } | TransportError::Connect { source, .. } => source,
            TransportError::Accept(source) | TransportError::Io(source) => source,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_reaches_through_context() {
        let err = TransportError::Connect {
            addr: "127.0.0.1:1".into(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
        assert!(err.to_string().starts_with("failed to connect to 127.0.0.1:1: "));
        assert_eq!(err.into_io().kind(), io::ErrorKind::ConnectionRefused);
    }
}
