use tracing::info;

/// A binary status output, such as an LED showing the service is reachable.
pub trait StatusIndicator {
    fn set(&mut self, on: bool);
}

/// Indicator that logs state changes.
#[derive(Debug, Default)]
pub struct LogIndicator {
    pin: Option<u8>,
    on: bool,
}

impl LogIndicator {
    pub fn new(pin: Option<u8>) -> Self {
        Self { pin, on: false }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl StatusIndicator for LogIndicator {
    fn set(&mut self, on: bool) {
        if self.on != on {
            info!(pin = ?self.pin, on, "status indicator");
        }
        self.on = on;
    }
}

/// Holds an indicator on for as long as the guard lives.
pub struct IndicatorGuard<I: StatusIndicator> {
    indicator: I,
}

impl<I: StatusIndicator> IndicatorGuard<I> {
    pub fn new(mut indicator: I) -> Self {
        indicator.set(true);
        Self { indicator }
    }
}

impl<I: StatusIndicator> Drop for IndicatorGuard<I> {
    fn drop(&mut self) {
        self.indicator.set(false);
    }
}
