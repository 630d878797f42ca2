//! Connection server for the stripctl protocol.
//!
//! [`StripServer`] owns the [`Controller`](stripctl_strip::Controller) and
//! services one client at a time: decode a message, dispatch it, send the
//! response, repeat until the client disconnects. [`Client`] is the
//! matching blocking client.

pub mod client;
pub mod error;
pub mod server;
pub mod session;
pub mod shutdown;

pub use client::Client;
pub use error::{ClientError, Result, ServerError};
pub use server::{ServerConfig, ServerState, StripServer, DEFAULT_ADDR, DEFAULT_POLL_INTERVAL};
pub use session::SessionEnd;
pub use shutdown::ShutdownSignal;
