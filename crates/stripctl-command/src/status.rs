use std::fmt;

/// Response status codes used by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Accepted,
    BadRequest,
    NotFound,
    Conflict,
    InternalServerError,
}

impl Status {
    pub const fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Accepted => 202,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::Conflict => 409,
            Status::InternalServerError => 500,
        }
    }

    /// Reason phrase sent as the envelope `message`.
    pub const fn phrase(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Accepted => "Accepted",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::Conflict => "Conflict",
            Status::InternalServerError => "Internal Server Error",
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        [
            Status::Ok,
            Status::Accepted,
            Status::BadRequest,
            Status::NotFound,
            Status::Conflict,
            Status::InternalServerError,
        ]
        .into_iter()
        .find(|status| status.code() == code)
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Status::Ok | Status::Accepted)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.phrase())
    }
}
