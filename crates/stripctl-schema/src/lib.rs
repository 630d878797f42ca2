//! JSON Schema validation for stripctl requests.
//!
//! Schemas are registered by name (the request envelope, and one per
//! command for its `args`) and compiled once. Validation reports every
//! violated constraint together with the path of the offending value,
//! e.g. `error in args.sections[1] : "x" is not of type "object"`.

pub mod config;
pub mod error;
pub mod registry;
pub mod validator;

pub use config::RegistryConfig;
pub use error::{Result, SchemaError};
pub use registry::SchemaRegistry;
pub use validator::{pointer_to_path, Violation};
