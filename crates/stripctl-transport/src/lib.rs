//! TCP transport abstraction for stripctl.
//!
//! This is the lowest layer of the workspace. The protocol codec and the
//! connection server build on the [`StripStream`] and [`TcpTransport`]
//! types provided here.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::StripStream;
pub use tcp::TcpTransport;
