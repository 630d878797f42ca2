use stripctl_strip::StripStatus;

use crate::cmd::send::connect;
use crate::cmd::StatusArgs;
use crate::exit::{client_error, status_exit_code, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_response, print_status, OutputFormat};

pub fn run(args: StatusArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = connect(&args.addr, &args.timeout)?;
    let response = client
        .request("status", None)
        .map_err(|err| client_error("status request failed", err))?;
    client.close();

    if !response.is_success() {
        print_response(&response, format);
        return Ok(status_exit_code(response.status));
    }

    let result = response
        .result
        .ok_or_else(|| CliError::new(DATA_INVALID, "status response carried no result"))?;
    let status: StripStatus = serde_json::from_value(result)
        .map_err(|err| CliError::new(DATA_INVALID, format!("unexpected status payload: {err}")))?;

    print_status(&status, format);
    Ok(SUCCESS)
}
