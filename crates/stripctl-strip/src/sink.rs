use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::color::Color;
use crate::config::SinkConfig;
use crate::error::SinkError;

/// Destination for rendered frames, typically a strip driver.
///
/// `begin` is called once before any other method. `set_pixel` stages a
/// color and `show` pushes the staged frame out.
pub trait PixelSink {
    fn begin(&mut self, strip_length: usize) -> Result<(), SinkError>;

    fn set_pixel(&mut self, index: usize, color: Color) -> Result<(), SinkError>;

    fn show(&mut self) -> Result<(), SinkError>;
}

#[derive(Debug, Default)]
struct Shown {
    pixels: Vec<Color>,
    shows: u64,
}

/// Read side of a [`MemorySink`]: the last frame shown and how many there were.
#[derive(Debug, Clone, Default)]
pub struct FrameHandle {
    inner: Arc<Mutex<Shown>>,
}

impl FrameHandle {
    fn lock(&self) -> MutexGuard<'_, Shown> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pixels of the last shown frame.
    pub fn pixels(&self) -> Vec<Color> {
        self.lock().pixels.clone()
    }

    pub fn pixel(&self, index: usize) -> Option<Color> {
        self.lock().pixels.get(index).copied()
    }

    /// Number of `show` calls so far.
    pub fn shows(&self) -> u64 {
        self.lock().shows
    }
}

/// Sink that keeps frames in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    staged: Vec<Color>,
    handle: FrameHandle,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that observes frames shown by this sink.
    pub fn handle(&self) -> FrameHandle {
        self.handle.clone()
    }
}

impl PixelSink for MemorySink {
    fn begin(&mut self, strip_length: usize) -> Result<(), SinkError> {
        self.staged = vec![Color::BLACK; strip_length];
        self.handle.lock().pixels = self.staged.clone();
        Ok(())
    }

    fn set_pixel(&mut self, index: usize, color: Color) -> Result<(), SinkError> {
        let strip_length = self.staged.len();
        let slot = self
            .staged
            .get_mut(index)
            .ok_or(SinkError::OutOfRange {
                index,
                strip_length,
            })?;
        *slot = color;
        Ok(())
    }

    fn show(&mut self) -> Result<(), SinkError> {
        let mut shown = self.handle.lock();
        shown.pixels.clone_from(&self.staged);
        shown.shows += 1;
        Ok(())
    }
}

/// Sink that reports frames through `tracing` instead of driving hardware.
#[derive(Debug)]
pub struct TraceSink {
    config: SinkConfig,
    staged: Vec<Color>,
    frames: u64,
}

impl TraceSink {
    pub fn new(config: SinkConfig) -> Self {
        Self {
            config,
            staged: Vec::new(),
            frames: 0,
        }
    }

    pub fn config(&self) -> &SinkConfig {
        &self.config
    }
}

impl PixelSink for TraceSink {
    fn begin(&mut self, strip_length: usize) -> Result<(), SinkError> {
        if strip_length == 0 {
            return Err(SinkError::Begin("strip length must be at least 1".into()));
        }
        self.staged = vec![Color::BLACK; strip_length];
        info!(
            strip_length,
            pin = self.config.pin,
            freq_hz = self.config.freq_hz,
            dma = self.config.dma,
            brightness = self.config.brightness,
            channel = self.config.channel,
            invert = self.config.invert,
            "pixel sink started"
        );
        Ok(())
    }

    fn set_pixel(&mut self, index: usize, color: Color) -> Result<(), SinkError> {
        let strip_length = self.staged.len();
        let slot = self
            .staged
            .get_mut(index)
            .ok_or(SinkError::OutOfRange {
                index,
                strip_length,
            })?;
        *slot = color;
        Ok(())
    }

    fn show(&mut self) -> Result<(), SinkError> {
        self.frames += 1;
        let lit = self.staged.iter().filter(|c| !c.is_black()).count();
        let first = self.staged.first().copied().unwrap_or_default();
        debug!(frame = self.frames, lit, first = %first, "frame shown");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_publishes_on_show() {
        let mut sink = MemorySink::new();
        let handle = sink.handle();
        sink.begin(4).unwrap();

        sink.set_pixel(1, Color::new(9, 9, 9)).unwrap();
        assert_eq!(handle.pixel(1), Some(Color::BLACK));
        assert_eq!(handle.shows(), 0);

        sink.show().unwrap();
        assert_eq!(handle.pixel(1), Some(Color::new(9, 9, 9)));
        assert_eq!(handle.pixels().len(), 4);
        assert_eq!(handle.shows(), 1);
    }

    #[test]
    fn out_of_range_pixel_is_rejected() {
        let mut sink = MemorySink::new();
        sink.begin(2).unwrap();
        assert!(matches!(
            sink.set_pixel(2, Color::BLACK),
            Err(SinkError::OutOfRange { index: 2, strip_length: 2 })
        ));

        let mut trace = TraceSink::new(SinkConfig::default());
        trace.begin(2).unwrap();
        assert!(trace.set_pixel(5, Color::BLACK).is_err());
    }

    #[test]
    fn trace_sink_counts_frames() {
        let mut sink = TraceSink::new(SinkConfig::default());
        assert!(matches!(sink.begin(0), Err(SinkError::Begin(_))));

        sink.begin(3).unwrap();
        sink.set_pixel(0, Color::new(1, 0, 0)).unwrap();
        sink.show().unwrap();
        sink.show().unwrap();
        assert_eq!(sink.frames, 2);
        assert_eq!(sink.config().pin, 18);
    }
}
