/// Errors that stop the server from starting or running.
///
/// Session-level failures never surface here; they end the session and the
/// accept loop moves on.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] stripctl_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] stripctl_frame::FrameError),

    /// A command schema failed to compile.
    #[error("schema error: {0}")]
    Schema(#[from] stripctl_schema::SchemaError),
}

/// Errors returned by [`Client`](crate::Client).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] stripctl_transport::TransportError),

    #[error("frame error: {0}")]
    Frame(#[from] stripctl_frame::FrameError),

    /// The request could not be encoded or the response was not an envelope.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
