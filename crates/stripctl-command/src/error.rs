use stripctl_strip::StripError;

use crate::status::Status;

/// Machine-readable error codes carried in error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    AlreadyOff,
    AlreadyOn,
    ExecutionError,
    Overlap,
    ParseError,
    BadRequest,
    SectionNotFound,
    InvalidRange,
    LengthMismatch,
}

impl ErrorCode {
    pub const fn code(self) -> u16 {
        match self {
            ErrorCode::AlreadyOff => 1,
            ErrorCode::AlreadyOn => 2,
            ErrorCode::ExecutionError => 3,
            ErrorCode::Overlap => 4,
            ErrorCode::ParseError => 6,
            ErrorCode::BadRequest => 7,
            ErrorCode::SectionNotFound => 8,
            ErrorCode::InvalidRange => 9,
            ErrorCode::LengthMismatch => 10,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ErrorCode::AlreadyOff => "ALREADY_OFF",
            ErrorCode::AlreadyOn => "ALREADY_ON",
            ErrorCode::ExecutionError => "EXECUTION_ERROR",
            ErrorCode::Overlap => "OVERLAP",
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::SectionNotFound => "SECTION_NOT_FOUND",
            ErrorCode::InvalidRange => "INVALID_RANGE",
            ErrorCode::LengthMismatch => "LENGTH_MISMATCH",
        }
    }

    /// The one place error codes are translated to response statuses.
    pub const fn status(self) -> Status {
        match self {
            ErrorCode::ParseError
            | ErrorCode::BadRequest
            | ErrorCode::InvalidRange
            | ErrorCode::LengthMismatch => Status::BadRequest,
            ErrorCode::SectionNotFound => Status::NotFound,
            ErrorCode::AlreadyOn | ErrorCode::AlreadyOff | ErrorCode::Overlap => Status::Conflict,
            ErrorCode::ExecutionError => Status::InternalServerError,
        }
    }

    pub const fn default_message(self) -> &'static str {
        match self {
            ErrorCode::AlreadyOff => "already off",
            ErrorCode::AlreadyOn => "already on",
            ErrorCode::ExecutionError => "command execution failed",
            ErrorCode::Overlap => "section overlaps an existing section",
            ErrorCode::ParseError => "request could not be parsed",
            ErrorCode::BadRequest => "malformed message",
            ErrorCode::SectionNotFound => "section not found",
            ErrorCode::InvalidRange => "range outside the strip",
            ErrorCode::LengthMismatch => "color list length does not match section size",
        }
    }
}

/// A request that could not be turned into a command.
///
/// Carries one message per violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .errors.join("; "))]
pub struct ParseError {
    errors: Vec<String>,
}

impl ParseError {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    /// A single violation at `path`.
    pub fn at(path: &str, message: impl std::fmt::Display) -> Self {
        Self::new(vec![format!("error in {path} : {message}")])
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// A command that was understood but could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ExecutionError, message)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Status {
        self.code.status()
    }
}

impl From<StripError> for ApiError {
    fn from(err: StripError) -> Self {
        let code = match &err {
            StripError::InvalidRange { .. } => ErrorCode::InvalidRange,
            StripError::Overlap { .. } => ErrorCode::Overlap,
            StripError::NotFound(_) => ErrorCode::SectionNotFound,
            StripError::LengthMismatch { .. } => ErrorCode::LengthMismatch,
            StripError::AlreadyOn(_) => ErrorCode::AlreadyOn,
            StripError::AlreadyOff(_) => ErrorCode::AlreadyOff,
            StripError::Sink(_) => ErrorCode::ExecutionError,
        };
        Self::new(code, err.to_string())
    }
}
