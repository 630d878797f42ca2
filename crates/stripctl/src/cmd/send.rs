use serde_json::Value;
use stripctl_frame::FrameConfig;
use stripctl_server::Client;

use crate::cmd::{parse_duration, SendArgs};
use crate::exit::{client_error, status_exit_code, CliError, CliResult, USAGE};
use crate::output::{print_response, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let command_args = parse_args(args.args.as_deref())?;
    let mut client = connect(&args.addr, &args.timeout)?;

    let response = client
        .request(&args.command, command_args)
        .map_err(|err| client_error("request failed", err))?;
    client.close();

    print_response(&response, format);
    Ok(status_exit_code(response.status))
}

/// Connect with `timeout` applied to both directions.
pub(crate) fn connect(addr: &str, timeout: &str) -> CliResult<Client> {
    let timeout = parse_duration(timeout)?;
    let config = FrameConfig {
        read_timeout: Some(timeout),
        write_timeout: Some(timeout),
        ..FrameConfig::default()
    };
    Client::connect_with_config(addr, config).map_err(|err| client_error("connect failed", err))
}

fn parse_args(raw: Option<&str>) -> CliResult<Option<Value>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| CliError::new(USAGE, format!("--args is not valid JSON: {err}")))?;
    if !value.is_object() {
        return Err(CliError::new(USAGE, "--args must be a JSON object"));
    }
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn args_must_be_an_object() {
        assert_eq!(parse_args(None).unwrap(), None);
        assert_eq!(
            parse_args(Some(r#"{"start": 0}"#)).unwrap(),
            Some(json!({"start": 0}))
        );
        assert_eq!(parse_args(Some("[1]")).unwrap_err().code, USAGE);
        assert_eq!(parse_args(Some("{oops")).unwrap_err().code, USAGE);
    }
}
