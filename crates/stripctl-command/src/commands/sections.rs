use serde::Deserialize;
use serde_json::{json, Value};
use stripctl_strip::{Color, Controller};

use super::{bind, parse_color, rendered};
use crate::command::{Command, Outcome};
use crate::error::{ApiError, ParseError};

pub(super) const NEW_SECTION_SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "start": { "type": "integer", "minimum": 0 },
        "end": { "type": "integer", "minimum": 0 },
        "color": { "type": "string" }
    },
    "required": ["start", "end", "color"]
}"#;

pub(super) const ADD_SECTIONS_SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "sections": {
            "type": "array",
            "items": {
                "type": "object",
                "properties": {
                    "start": { "type": "integer", "minimum": 0 },
                    "end": { "type": "integer", "minimum": 0 },
                    "color": { "type": "string" }
                },
                "required": ["start", "end", "color"]
            }
        }
    },
    "required": ["sections"]
}"#;

pub(super) const EDIT_SECTION_SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "section_id": { "type": "string" },
        "start": { "type": "integer", "minimum": 0 },
        "end": { "type": "integer", "minimum": 0 },
        "color": { "type": "string" }
    },
    "required": ["section_id"]
}"#;

pub(super) const REMOVE_SECTIONS_SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "sections": { "type": "array", "items": { "type": "string" } }
    },
    "required": ["sections"]
}"#;

#[derive(Deserialize)]
struct SectionArgs {
    start: usize,
    end: usize,
    color: String,
}

/// `new_section {start, end, color}` -> `{"id": ...}`
#[derive(Debug, Default)]
pub struct NewSectionCommand {
    start: usize,
    end: usize,
    color: Color,
}

impl Command for NewSectionCommand {
    fn validate(&mut self, args: &Value) -> Result<(), ParseError> {
        let args: SectionArgs = bind(args)?;
        self.color = parse_color("args.color", &args.color)?;
        self.start = args.start;
        self.end = args.end;
        Ok(())
    }

    fn execute(&self, controller: &mut Controller) -> Result<Outcome, ApiError> {
        let id = rendered(controller, |ctl| ctl.new_section(self.start, self.end, self.color))?;
        Ok(Outcome::Result(json!({ "id": id })))
    }
}

/// `add_sections {sections: [{start, end, color}]}` -> `{"sections": [ids]}`
///
/// All or nothing: one bad candidate rejects the whole batch.
#[derive(Debug, Default)]
pub struct AddSectionsCommand {
    batch: Vec<stripctl_strip::NewSection>,
}

#[derive(Deserialize)]
struct AddSectionsArgs {
    sections: Vec<SectionArgs>,
}

impl Command for AddSectionsCommand {
    fn validate(&mut self, args: &Value) -> Result<(), ParseError> {
        let args: AddSectionsArgs = bind(args)?;

        let mut errors = Vec::new();
        for (index, section) in args.sections.iter().enumerate() {
            match parse_color(&format!("args.sections[{index}].color"), &section.color) {
                Ok(color) => self.batch.push(stripctl_strip::NewSection::new(
                    section.start,
                    section.end,
                    color,
                )),
                Err(err) => errors.extend_from_slice(err.errors()),
            }
        }
        if !errors.is_empty() {
            return Err(ParseError::new(errors));
        }
        Ok(())
    }

    fn execute(&self, controller: &mut Controller) -> Result<Outcome, ApiError> {
        let ids = rendered(controller, |ctl| ctl.new_sections(&self.batch))?;
        Ok(Outcome::Result(json!({ "sections": ids })))
    }
}

/// `edit_section {section_id, start?, end?, color?}`
#[derive(Debug, Default)]
pub struct EditSectionCommand {
    section_id: String,
    start: Option<usize>,
    end: Option<usize>,
    color: Option<Color>,
}

#[derive(Deserialize)]
struct EditSectionArgs {
    section_id: String,
    start: Option<usize>,
    end: Option<usize>,
    color: Option<String>,
}

impl Command for EditSectionCommand {
    fn validate(&mut self, args: &Value) -> Result<(), ParseError> {
        let args: EditSectionArgs = bind(args)?;
        self.color = args
            .color
            .as_deref()
            .map(|text| parse_color("args.color", text))
            .transpose()?;
        self.section_id = args.section_id;
        self.start = args.start;
        self.end = args.end;
        Ok(())
    }

    fn execute(&self, controller: &mut Controller) -> Result<Outcome, ApiError> {
        rendered(controller, |ctl| {
            ctl.edit_section(&self.section_id, self.start, self.end, self.color)
        })?;
        Ok(Outcome::Done)
    }
}

/// `remove_sections {sections: [id]}`; nothing is removed if any id is unknown.
#[derive(Debug, Default)]
pub struct RemoveSectionsCommand {
    ids: Vec<String>,
}

#[derive(Deserialize)]
struct RemoveSectionsArgs {
    sections: Vec<String>,
}

impl Command for RemoveSectionsCommand {
    fn validate(&mut self, args: &Value) -> Result<(), ParseError> {
        let args: RemoveSectionsArgs = bind(args)?;
        self.ids = args.sections;
        Ok(())
    }

    fn execute(&self, controller: &mut Controller) -> Result<Outcome, ApiError> {
        rendered(controller, |ctl| ctl.remove_sections(&self.ids))?;
        Ok(Outcome::Done)
    }
}

/// `reset`: remove every section.
#[derive(Debug, Default)]
pub struct ResetCommand;

impl Command for ResetCommand {
    fn validate(&mut self, _args: &Value) -> Result<(), ParseError> {
        Ok(())
    }

    fn execute(&self, controller: &mut Controller) -> Result<Outcome, ApiError> {
        rendered(controller, |ctl| {
            ctl.remove_all_sections();
            Ok(())
        })?;
        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::commands::testing::{controller, run, validated, FlakySink};
    use crate::error::ErrorCode;

    const RED: Color = Color::new(255, 0, 0);

    fn created_id(outcome: Outcome) -> String {
        match outcome {
            Outcome::Result(value) => value["id"].as_str().unwrap().to_string(),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn new_section_returns_id_and_renders() {
        let (mut ctl, frames) = controller(300);
        let outcome = run::<NewSectionCommand>(
            json!({"start": 0, "end": 99, "color": "#ff0000"}),
            &mut ctl,
        )
        .unwrap();

        let id = created_id(outcome);
        assert!(ctl.store().get(&id).is_ok());
        assert_eq!(frames.pixel(99), Some(RED));
        assert_eq!(frames.pixel(150), Some(Color::BLACK));
        assert_eq!(frames.shows(), 1);
    }

    #[test]
    fn failed_render_leaves_no_section_behind() {
        let mut ctl = Controller::new(300, Box::new(FlakySink { failures: 1 })).unwrap();
        let args = json!({"start": 0, "end": 9, "color": "#ff0000"});

        let err = run::<NewSectionCommand>(args.clone(), &mut ctl).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ExecutionError);
        assert!(ctl.store().is_empty());

        let id = created_id(run::<NewSectionCommand>(args, &mut ctl).unwrap());
        assert_eq!(ctl.store().get(&id).unwrap().end(), 9);
    }

    #[test]
    fn failed_render_rolls_back_batch_and_reset() {
        let mut flaky = Controller::new(50, Box::new(FlakySink { failures: 2 })).unwrap();
        let kept = flaky.new_section(40, 49, RED).unwrap();
        let err = run::<AddSectionsCommand>(
            json!({"sections": [{"start": 0, "end": 9, "color": "#00f"}]}),
            &mut flaky,
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ExecutionError);
        assert_eq!(flaky.store().len(), 1);

        let err = run::<ResetCommand>(json!({}), &mut flaky).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ExecutionError);
        assert_eq!(flaky.store().len(), 1);
        assert_eq!(flaky.store().get(&kept).unwrap().start(), 40);
    }

    #[test]
    fn new_section_rejects_bad_color() {
        let err = validated::<NewSectionCommand>(json!({"start": 0, "end": 1, "color": "red"}))
            .unwrap_err();
        assert!(err.errors()[0].starts_with("error in args.color : "));
    }

    #[test]
    fn new_section_out_of_strip_is_invalid_range() {
        let (mut ctl, frames) = controller(300);
        let err = run::<NewSectionCommand>(
            json!({"start": 250, "end": 300, "color": "#fff"}),
            &mut ctl,
        )
        .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidRange);
        assert_eq!(frames.shows(), 0);
    }

    #[test]
    fn add_sections_is_atomic() {
        let (mut ctl, frames) = controller(300);
        let err = run::<AddSectionsCommand>(
            json!({"sections": [
                {"start": 0, "end": 9, "color": "#ff0000"},
                {"start": 5, "end": 15, "color": "#0000ff"}
            ]}),
            &mut ctl,
        )
        .unwrap_err();

        assert_eq!(err.code(), ErrorCode::Overlap);
        assert!(ctl.store().is_empty());
        assert_eq!(frames.shows(), 0);
    }

    #[test]
    fn add_sections_returns_ids_in_order() {
        let (mut ctl, _) = controller(300);
        let outcome = run::<AddSectionsCommand>(
            json!({"sections": [
                {"start": 100, "end": 109, "color": "#ff0000"},
                {"start": 0, "end": 9, "color": "rgb(0, 0, 255)"}
            ]}),
            &mut ctl,
        )
        .unwrap();

        let Outcome::Result(value) = outcome else {
            panic!("expected a result");
        };
        let ids = value["sections"].as_array().unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(
            ctl.store().get(ids[0].as_str().unwrap()).unwrap().start(),
            100
        );
    }

    #[test]
    fn add_sections_reports_every_bad_color() {
        let err = validated::<AddSectionsCommand>(json!({"sections": [
            {"start": 0, "end": 9, "color": "nope"},
            {"start": 10, "end": 19, "color": "#00ff00"},
            {"start": 20, "end": 29, "color": "#12"}
        ]}))
        .unwrap_err();

        assert_eq!(err.errors().len(), 2);
        assert!(err.errors()[0].starts_with("error in args.sections[0].color : "));
        assert!(err.errors()[1].starts_with("error in args.sections[2].color : "));
    }

    #[test]
    fn edit_section_moves_and_recolors() {
        let (mut ctl, frames) = controller(100);
        let id = ctl.new_section(0, 9, RED).unwrap();

        run::<EditSectionCommand>(
            json!({"section_id": id, "start": 50, "end": 54, "color": "#00ff00"}),
            &mut ctl,
        )
        .unwrap();

        assert_eq!(frames.pixel(0), Some(Color::BLACK));
        assert_eq!(frames.pixel(52), Some(Color::new(0, 255, 0)));
    }

    #[test]
    fn edit_unknown_section_is_not_found() {
        let (mut ctl, _) = controller(100);
        let err = run::<EditSectionCommand>(json!({"section_id": "sec-none"}), &mut ctl)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SectionNotFound);
    }

    #[test]
    fn remove_sections_is_atomic() {
        let (mut ctl, _) = controller(100);
        let id = ctl.new_section(0, 9, RED).unwrap();

        let err = run::<RemoveSectionsCommand>(
            json!({"sections": [id, "does-not-exist"]}),
            &mut ctl,
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::SectionNotFound);
        assert_eq!(ctl.store().len(), 1);

        run::<RemoveSectionsCommand>(json!({"sections": [id]}), &mut ctl).unwrap();
        assert!(ctl.store().is_empty());
    }

    #[test]
    fn reset_clears_and_renders_background() {
        let (mut ctl, frames) = controller(20);
        ctl.new_section(0, 19, RED).unwrap();

        assert_eq!(run::<ResetCommand>(json!({}), &mut ctl).unwrap(), Outcome::Done);
        assert!(ctl.store().is_empty());
        assert_eq!(frames.pixels(), vec![Color::BLACK; 20]);
    }
}
