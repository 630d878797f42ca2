//! In-memory model of an addressable light strip.
//!
//! The strip is split into named, non-overlapping sections, each with its
//! own per-pixel colors and on/off state. The [`Controller`] owns the
//! section store and a [`PixelSink`], and pushes a full frame to the sink
//! on every [`Controller::render`] call.

pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod indicator;
pub mod section;
pub mod sink;
pub mod store;

pub use color::{Color, ColorParseError};
pub use config::{SinkConfig, StripConfig};
pub use controller::{Controller, Limits, SectionStatus, StripStatus};
pub use error::{Result, SinkError, StripError};
pub use indicator::{IndicatorGuard, LogIndicator, StatusIndicator};
pub use section::{NewSection, Section};
pub use sink::{FrameHandle, MemorySink, PixelSink, TraceSink};
pub use store::{Recolor, SectionStore};
