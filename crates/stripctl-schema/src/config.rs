/// Controls schema validation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryConfig {
    /// When true, object schemas reject properties they don't declare.
    pub strict_mode: bool,
    /// When true, validating against an unknown name returns `SchemaError::NoSchema`.
    pub fail_on_missing_schema: bool,
}
