/// Errors reported by a pixel sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The sink could not be initialised.
    #[error("pixel sink failed to start: {0}")]
    Begin(String),

    /// A pixel index beyond the configured strip.
    #[error("pixel {index} is outside the strip (length {strip_length})")]
    OutOfRange { index: usize, strip_length: usize },

    /// The sink failed to push the frame to the device.
    #[error("pixel sink failed to show frame: {0}")]
    Show(String),
}

/// Errors from section and strip operations.
#[derive(Debug, thiserror::Error)]
pub enum StripError {
    /// Bounds violate `0 <= start <= end < strip_length`.
    #[error("invalid range [{start}, {end}] for strip of length {strip_length}")]
    InvalidRange {
        start: usize,
        end: usize,
        strip_length: usize,
    },

    /// The interval shares at least one pixel with another section.
    #[error("range [{start}, {end}] overlaps an existing section")]
    Overlap { start: usize, end: usize },

    /// No section with the given id.
    #[error("section {0} not found")]
    NotFound(String),

    /// A color list whose length differs from the section size.
    #[error("expected {expected} colors, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The strip or section is already on.
    #[error("{} is already on", target(.0))]
    AlreadyOn(Option<String>),

    /// The strip or section is already off.
    #[error("{} is already off", target(.0))]
    AlreadyOff(Option<String>),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

fn target(section: &Option<String>) -> String {
    match section {
        Some(id) => format!("section {id}"),
        None => "strip".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, StripError>;
