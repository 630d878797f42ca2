use stripctl_frame::{FrameConfig, MAX_BODY_LEN};
use stripctl_schema::RegistryConfig;
use stripctl_server::{ServerConfig, ShutdownSignal, StripServer};
use stripctl_strip::{
    Controller, IndicatorGuard, LogIndicator, SinkConfig, StripConfig, TraceSink,
};

use crate::cmd::{parse_duration, ServeArgs};
use crate::exit::{server_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS, USAGE};

pub fn run(args: ServeArgs) -> CliResult<i32> {
    let (strip, server_config) = configure(&args)?;

    let sink = TraceSink::new(strip.sink);
    let controller = Controller::new(strip.strip_length, Box::new(sink))
        .map_err(|err| CliError::new(FAILURE, format!("strip init failed: {err}")))?;

    let shutdown = ShutdownSignal::new();
    let mut server = StripServer::bind(server_config, controller)
        .map_err(|err| server_error("bind failed", err))?
        .with_shutdown(shutdown.clone());
    install_ctrlc_handler(shutdown)?;

    let _status_led = IndicatorGuard::new(LogIndicator::new(strip.status_led));
    println!("listening on {}", server.local_addr());

    server
        .serve()
        .map_err(|err| server_error("server failed", err))?;
    Ok(SUCCESS)
}

fn configure(args: &ServeArgs) -> CliResult<(StripConfig, ServerConfig)> {
    if args.strip_length == 0 {
        return Err(CliError::new(USAGE, "--strip-length must be at least 1"));
    }
    if args.max_body == 0 || args.max_body > MAX_BODY_LEN {
        return Err(CliError::new(
            USAGE,
            format!("--max-body must be between 1 and {MAX_BODY_LEN}"),
        ));
    }

    let strip = StripConfig {
        strip_length: args.strip_length,
        sink: SinkConfig {
            pin: args.pin,
            freq_hz: args.freq_hz,
            dma: args.dma,
            brightness: args.brightness,
            channel: args.channel,
            invert: args.invert,
        },
        status_led: args.status_led,
    };

    let server = ServerConfig {
        addr: format!("{}:{}", args.host, args.port),
        frame: FrameConfig {
            max_body_size: args.max_body,
            ..FrameConfig::default()
        },
        poll_interval: parse_duration(&args.poll_interval)?,
        registry: RegistryConfig {
            strict_mode: args.strict_args,
            fail_on_missing_schema: true,
        },
    };

    Ok((strip, server))
}

fn install_ctrlc_handler(shutdown: ShutdownSignal) -> CliResult<()> {
    ctrlc::set_handler(move || {
        tracing::info!("shutdown requested");
        shutdown.trigger();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
