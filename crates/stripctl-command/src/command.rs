use serde_json::Value;
use stripctl_strip::Controller;

use crate::error::{ApiError, ParseError};

/// What a successfully executed command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Success with no payload.
    Done,
    /// Success with a `result` payload.
    Result(Value),
    /// The client asked to end the session.
    Disconnect,
}

/// A protocol command.
///
/// Instances are built fresh for every request. `validate` binds the
/// (already schema-checked) arguments and performs semantic checks such as
/// color parsing; `execute` is only called after `validate` succeeded.
pub trait Command {
    fn validate(&mut self, args: &Value) -> Result<(), ParseError>;

    fn execute(&self, controller: &mut Controller) -> Result<Outcome, ApiError>;
}
