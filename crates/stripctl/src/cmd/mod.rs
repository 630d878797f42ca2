use std::time::Duration;

use clap::{Args, Subcommand};
use stripctl_frame::MAX_BODY_LEN;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod send;
pub mod serve;
pub mod status;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the strip control server.
    Serve(ServeArgs),
    /// Send one command and print the response.
    Send(SendArgs),
    /// Print the strip and its sections.
    Status(StatusArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args),
        Command::Send(args) => send::run(args, format),
        Command::Status(args) => status::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Interface to listen on.
    #[arg(long, env = "STRIPCTL_HOST", default_value = "0.0.0.0")]
    pub host: String,
    /// TCP port (0 picks a free one).
    #[arg(long, env = "STRIPCTL_PORT", default_value_t = 8000)]
    pub port: u16,
    /// Number of pixels on the strip.
    #[arg(long, env = "STRIPCTL_STRIP_LENGTH", default_value_t = 300)]
    pub strip_length: usize,
    /// GPIO pin driving the data line.
    #[arg(long, env = "STRIPCTL_PIN", default_value_t = 18)]
    pub pin: u8,
    /// Signal frequency in Hz.
    #[arg(long, env = "STRIPCTL_FREQ_HZ", default_value_t = 800_000)]
    pub freq_hz: u32,
    /// DMA channel.
    #[arg(long, env = "STRIPCTL_DMA", default_value_t = 10)]
    pub dma: u8,
    /// Global brightness (0-255).
    #[arg(long, env = "STRIPCTL_BRIGHTNESS", default_value_t = 255)]
    pub brightness: u8,
    /// PWM channel.
    #[arg(long, env = "STRIPCTL_CHANNEL", default_value_t = 0)]
    pub channel: u8,
    /// Invert the data signal.
    #[arg(long, env = "STRIPCTL_INVERT")]
    pub invert: bool,
    /// Pin of the status LED, if any.
    #[arg(long, env = "STRIPCTL_STATUS_LED")]
    pub status_led: Option<u8>,
    /// Largest accepted message body in bytes.
    #[arg(long, env = "STRIPCTL_MAX_BODY", default_value_t = MAX_BODY_LEN)]
    pub max_body: usize,
    /// How often blocked reads check for shutdown (e.g. 200ms, 1s).
    #[arg(long, env = "STRIPCTL_POLL_INTERVAL", default_value = "200ms")]
    pub poll_interval: String,
    /// Reject command arguments that are not declared.
    #[arg(long, env = "STRIPCTL_STRICT_ARGS")]
    pub strict_args: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Server address, host:port.
    pub addr: String,
    /// Command name, e.g. new_section.
    pub command: String,
    /// Command arguments as a JSON object.
    #[arg(long)]
    pub args: Option<String>,
    /// Response timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Server address, host:port.
    pub addr: String,
    /// Response timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(number) => (number, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
