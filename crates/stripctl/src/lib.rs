//! Network control plane for addressable LED strips.
//!
//! A TCP server owns an in-memory model of the strip (named,
//! non-overlapping sections) and accepts JSON commands framed with a
//! `Content-Length` header, one client at a time.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP stream and listener
//! - [`frame`]: `Content-Length` message framing
//! - [`schema`]: JSON Schema registry for command arguments
//! - [`strip`]: section model, colors, pixel sinks
//! - [`command`]: command table, dispatch and response envelopes
//! - [`server`]: session loop, accept loop and blocking client

/// Re-export transport types.
pub mod transport {
    pub use stripctl_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use stripctl_frame::*;
}

/// Re-export schema types.
pub mod schema {
    pub use stripctl_schema::*;
}

/// Re-export strip model types.
pub mod strip {
    pub use stripctl_strip::*;
}

/// Re-export command dispatch types.
pub mod command {
    pub use stripctl_command::*;
}

/// Re-export server and client types.
pub mod server {
    pub use stripctl_server::*;
}
