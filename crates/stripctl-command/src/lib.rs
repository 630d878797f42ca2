//! Command dispatch for the stripctl protocol.
//!
//! A request body is a JSON envelope `{"command": "<name>", "args": {...}}`.
//! The [`Dispatcher`] validates the envelope and the command arguments
//! against their schemas, binds the arguments to a typed [`Command`],
//! executes it against a [`Controller`](stripctl_strip::Controller) and
//! wraps the outcome in a [`Response`] envelope.

pub mod command;
pub mod commands;
pub mod dispatch;
pub mod error;
pub mod response;
pub mod status;

pub use command::{Command, Outcome};
pub use commands::{lookup, CommandSpec, COMMANDS};
pub use dispatch::{Dispatched, Dispatcher, ENVELOPE_SCHEMA};
pub use error::{ApiError, ErrorCode, ParseError};
pub use response::Response;
pub use status::Status;
