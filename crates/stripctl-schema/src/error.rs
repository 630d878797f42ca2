use crate::validator::Violation;

/// Errors that can occur during schema registration and validation.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema could not be compiled.
    #[error("failed to compile schema: {0}")]
    CompileFailed(String),

    /// The value failed schema validation.
    #[error("validation failed for {name}: {} violation(s)", violations.len())]
    ValidationFailed {
        name: String,
        violations: Vec<Violation>,
    },

    /// No schema registered under the given name.
    #[error("no schema registered for {0}")]
    NoSchema(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
