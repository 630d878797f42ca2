use serde_json::Value;
use stripctl_strip::Controller;

use crate::command::{Command, Outcome};
use crate::error::{ApiError, ParseError};

/// `status`: snapshot of the strip and its sections.
#[derive(Debug, Default)]
pub struct StatusCommand;

impl Command for StatusCommand {
    fn validate(&mut self, _args: &Value) -> Result<(), ParseError> {
        Ok(())
    }

    fn execute(&self, controller: &mut Controller) -> Result<Outcome, ApiError> {
        let status = serde_json::to_value(controller.status())
            .map_err(|err| ApiError::execution(format!("failed to encode status: {err}")))?;
        Ok(Outcome::Result(status))
    }
}

/// `disconnect`: end the session. Does not touch the strip.
#[derive(Debug, Default)]
pub struct DisconnectCommand;

impl Command for DisconnectCommand {
    fn validate(&mut self, _args: &Value) -> Result<(), ParseError> {
        Ok(())
    }

    fn execute(&self, _controller: &mut Controller) -> Result<Outcome, ApiError> {
        Ok(Outcome::Disconnect)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stripctl_strip::Color;

    use super::*;
    use crate::commands::testing::{controller, run};

    #[test]
    fn status_reports_sections_in_order() {
        let (mut ctl, frames) = controller(300);
        ctl.new_section(100, 199, Color::new(0, 0, 255)).unwrap();
        ctl.new_section(0, 99, Color::new(255, 0, 0)).unwrap();

        let Outcome::Result(status) = run::<StatusCommand>(json!({}), &mut ctl).unwrap() else {
            panic!("expected a result");
        };
        assert_eq!(status["strip_length"], 300);
        assert_eq!(status["sections"][0]["color"], "#ff0000");
        assert_eq!(status["sections"][0]["is_on"], true);
        assert_eq!(status["sections"][0]["limits"], json!({"start": 0, "end": 99}));
        assert_eq!(status["sections"][1]["limits"]["start"], 100);
        assert_eq!(frames.shows(), 0);
    }

    #[test]
    fn disconnect_leaves_strip_alone() {
        let (mut ctl, frames) = controller(10);
        assert_eq!(
            run::<DisconnectCommand>(json!({}), &mut ctl).unwrap(),
            Outcome::Disconnect
        );
        assert_eq!(frames.shows(), 0);
    }
}
