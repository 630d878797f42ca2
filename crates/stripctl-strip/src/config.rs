/// Hardware parameters handed to the pixel sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// GPIO pin driving the strip data line.
    pub pin: u8,
    /// Signal frequency in Hz.
    pub freq_hz: u32,
    /// DMA channel.
    pub dma: u8,
    /// Global brightness, 0-255.
    pub brightness: u8,
    /// PWM channel.
    pub channel: u8,
    /// Invert the signal (for inverting level shifters).
    pub invert: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            pin: 18,
            freq_hz: 800_000,
            dma: 10,
            brightness: 255,
            channel: 0,
            invert: false,
        }
    }
}

/// Strip geometry plus sink parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripConfig {
    /// Number of addressable pixels.
    pub strip_length: usize,
    pub sink: SinkConfig,
    /// Pin of the optional status LED.
    pub status_led: Option<u8>,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            strip_length: 300,
            sink: SinkConfig::default(),
            status_led: None,
        }
    }
}
