use serde::Deserialize;
use serde_json::Value;
use stripctl_strip::Controller;

use super::{bind, rendered};
use crate::command::{Command, Outcome};
use crate::error::{ApiError, ParseError};

pub(super) const TOGGLE_SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "section_id": { "type": "string" }
    }
}"#;

#[derive(Deserialize)]
struct ToggleArgs {
    section_id: Option<String>,
}

/// `turn_on {section_id?}`: the whole strip, or one section.
#[derive(Debug, Default)]
pub struct TurnOnCommand {
    section_id: Option<String>,
}

impl Command for TurnOnCommand {
    fn validate(&mut self, args: &Value) -> Result<(), ParseError> {
        self.section_id = bind::<ToggleArgs>(args)?.section_id;
        Ok(())
    }

    fn execute(&self, controller: &mut Controller) -> Result<Outcome, ApiError> {
        rendered(controller, |ctl| ctl.turn_on(self.section_id.as_deref()))?;
        Ok(Outcome::Done)
    }
}

/// `turn_off {section_id?}`: the whole strip, or one section.
#[derive(Debug, Default)]
pub struct TurnOffCommand {
    section_id: Option<String>,
}

impl Command for TurnOffCommand {
    fn validate(&mut self, args: &Value) -> Result<(), ParseError> {
        self.section_id = bind::<ToggleArgs>(args)?.section_id;
        Ok(())
    }

    fn execute(&self, controller: &mut Controller) -> Result<Outcome, ApiError> {
        rendered(controller, |ctl| ctl.turn_off(self.section_id.as_deref()))?;
        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stripctl_strip::Color;

    use super::*;
    use crate::commands::testing::{controller, run};
    use crate::error::ErrorCode;

    #[test]
    fn turning_off_twice_conflicts() {
        let (mut ctl, frames) = controller(10);
        let id = ctl.new_section(0, 4, Color::new(255, 0, 0)).unwrap();

        run::<TurnOffCommand>(json!({"section_id": id}), &mut ctl).unwrap();
        assert_eq!(frames.pixel(0), Some(Color::BLACK));

        let err = run::<TurnOffCommand>(json!({"section_id": id}), &mut ctl).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyOff);
    }

    #[test]
    fn whole_strip_toggle() {
        let (mut ctl, frames) = controller(10);
        ctl.set_color(Color::new(0, 0, 255), None).unwrap();

        let err = run::<TurnOnCommand>(json!({}), &mut ctl).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyOn);

        run::<TurnOffCommand>(json!({}), &mut ctl).unwrap();
        assert_eq!(frames.pixels(), vec![Color::BLACK; 10]);

        run::<TurnOnCommand>(json!({}), &mut ctl).unwrap();
        assert_eq!(frames.pixels(), vec![Color::new(0, 0, 255); 10]);
    }
}
