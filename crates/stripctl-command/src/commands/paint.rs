use serde::Deserialize;
use serde_json::Value;
use stripctl_strip::{Color, Controller};

use super::{bind, parse_color, rendered};
use crate::command::{Command, Outcome};
use crate::error::{ApiError, ParseError};

pub(super) const SET_COLOR_SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "color": { "type": "string" },
        "section_id": { "type": "string" }
    },
    "required": ["color"]
}"#;

/// `set_color {color, section_id?}`: fill a section, or set the background.
#[derive(Debug, Default)]
pub struct SetColorCommand {
    color: Color,
    section_id: Option<String>,
}

#[derive(Deserialize)]
struct SetColorArgs {
    color: String,
    section_id: Option<String>,
}

impl Command for SetColorCommand {
    fn validate(&mut self, args: &Value) -> Result<(), ParseError> {
        let args: SetColorArgs = bind(args)?;
        self.color = parse_color("args.color", &args.color)?;
        self.section_id = args.section_id;
        Ok(())
    }

    fn execute(&self, controller: &mut Controller) -> Result<Outcome, ApiError> {
        rendered(controller, |ctl| ctl.set_color(self.color, self.section_id.as_deref()))?;
        Ok(Outcome::Done)
    }
}
