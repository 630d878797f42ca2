use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ApiError, ErrorCode, ParseError};
use crate::status::Status;

/// Response envelope: `{status, message, result?, description?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Response {
    pub fn new(status: Status) -> Self {
        Self {
            status: status.code(),
            message: status.phrase().to_string(),
            result: None,
            description: None,
        }
    }

    /// `200 OK`, optionally with a result.
    pub fn ok(result: Option<Value>) -> Self {
        Self {
            result,
            ..Self::new(Status::Ok)
        }
    }

    /// `202 Accepted`, used to acknowledge `disconnect`.
    pub fn accepted() -> Self {
        Self::new(Status::Accepted)
    }

    /// Error response with `result: {"error": NAME, "code": n}`.
    pub fn error(code: ErrorCode, description: impl Into<String>) -> Self {
        Self {
            result: Some(json!({ "error": code.name(), "code": code.code() })),
            description: Some(description.into()),
            ..Self::new(code.status())
        }
    }

    /// `400 Bad Request` for a message that could not be framed.
    pub fn framing_error(detail: impl Into<String>) -> Self {
        Self::error(ErrorCode::BadRequest, detail)
    }

    pub fn status(&self) -> Option<Status> {
        Status::from_code(self.status)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `result.error` code name of an error response.
    pub fn error_name(&self) -> Option<&str> {
        self.result.as_ref()?.get("error")?.as_str()
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

impl From<&ApiError> for Response {
    fn from(err: &ApiError) -> Self {
        Self::error(err.code(), err.message())
    }
}

impl From<&ParseError> for Response {
    fn from(err: &ParseError) -> Self {
        let mut response = Self::error(ErrorCode::ParseError, err.to_string());
        if let Some(Value::Object(result)) = response.result.as_mut() {
            result.insert("errors".to_string(), json!(err.errors()));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_omits_empty_fields() {
        let body = Response::ok(None).to_bytes().unwrap();
        assert_eq!(body, br#"{"status":200,"message":"OK"}"#);

        let body = Response::ok(Some(json!({"id": "sec-1"}))).to_bytes().unwrap();
        assert_eq!(
            body,
            br#"{"status":200,"message":"OK","result":{"id":"sec-1"}}"#
        );
    }

    #[test]
    fn api_error_envelope() {
        let err = ApiError::new(ErrorCode::AlreadyOff, "section sec-1 is already off");
        let response = Response::from(&err);

        assert_eq!(response.status, 409);
        assert_eq!(response.message, "Conflict");
        assert_eq!(response.error_name(), Some("ALREADY_OFF"));
        assert_eq!(response.result.as_ref().unwrap()["code"], 1);
        assert_eq!(
            response.description.as_deref(),
            Some("section sec-1 is already off")
        );
        assert!(!response.is_success());
    }

    #[test]
    fn parse_error_lists_violations() {
        let err = ParseError::new(vec![
            "error in args.start : -1 is less than the minimum of 0".into(),
            "error in args : \"color\" is a required property".into(),
        ]);
        let response = Response::from(&err);

        assert_eq!(response.status(), Some(Status::BadRequest));
        let errors = response.result.as_ref().unwrap()["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(response.error_name(), Some("PARSE_ERROR"));
    }

    #[test]
    fn framing_error_is_bad_request() {
        let response = Response::framing_error("invalid message header");
        assert_eq!(response.status, 400);
        assert_eq!(response.error_name(), Some("BAD_REQUEST"));
    }

    #[test]
    fn parses_from_wire() {
        let response =
            Response::from_bytes(br#"{"status":202,"message":"Accepted"}"#).unwrap();
        assert_eq!(response, Response::accepted());
        assert!(response.is_success());
    }
}
