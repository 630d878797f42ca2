//! The command table and the built-in commands.

mod paint;
mod power;
mod sections;
mod session;

use serde::de::DeserializeOwned;
use serde_json::Value;
use stripctl_strip::{Color, Controller, Result as StripResult};

use crate::command::Command;
use crate::error::{ApiError, ParseError};

pub use paint::SetColorCommand;
pub use power::{TurnOffCommand, TurnOnCommand};
pub use sections::{
    AddSectionsCommand, EditSectionCommand, NewSectionCommand, RemoveSectionsCommand, ResetCommand,
};
pub use session::{DisconnectCommand, StatusCommand};

/// One entry of the command table.
pub struct CommandSpec {
    pub name: &'static str,
    /// JSON Schema for the command's `args` object.
    pub args_schema: &'static str,
    pub build: fn() -> Box<dyn Command>,
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn build<C: Command + Default + 'static>() -> Box<dyn Command> {
    Box::new(C::default())
}

/// Every command the server understands.
pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "new_section",
        args_schema: sections::NEW_SECTION_SCHEMA,
        build: build::<NewSectionCommand>,
    },
    CommandSpec {
        name: "add_sections",
        args_schema: sections::ADD_SECTIONS_SCHEMA,
        build: build::<AddSectionsCommand>,
    },
    CommandSpec {
        name: "edit_section",
        args_schema: sections::EDIT_SECTION_SCHEMA,
        build: build::<EditSectionCommand>,
    },
    CommandSpec {
        name: "set_color",
        args_schema: paint::SET_COLOR_SCHEMA,
        build: build::<SetColorCommand>,
    },
    CommandSpec {
        name: "remove_sections",
        args_schema: sections::REMOVE_SECTIONS_SCHEMA,
        build: build::<RemoveSectionsCommand>,
    },
    CommandSpec {
        name: "reset",
        args_schema: NO_ARGS_SCHEMA,
        build: build::<ResetCommand>,
    },
    CommandSpec {
        name: "turn_on",
        args_schema: power::TOGGLE_SCHEMA,
        build: build::<TurnOnCommand>,
    },
    CommandSpec {
        name: "turn_off",
        args_schema: power::TOGGLE_SCHEMA,
        build: build::<TurnOffCommand>,
    },
    CommandSpec {
        name: "status",
        args_schema: NO_ARGS_SCHEMA,
        build: build::<StatusCommand>,
    },
    CommandSpec {
        name: "disconnect",
        args_schema: NO_ARGS_SCHEMA,
        build: build::<DisconnectCommand>,
    },
];

const NO_ARGS_SCHEMA: &str = r#"{ "type": "object" }"#;

/// Find a command by name.
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

/// Deserialize `args` into a typed argument struct.
fn bind<T: DeserializeOwned>(args: &Value) -> Result<T, ParseError> {
    T::deserialize(args).map_err(|err| ParseError::at("args", err))
}

fn parse_color(path: &str, text: &str) -> Result<Color, ParseError> {
    text.parse().map_err(|err| ParseError::at(path, err))
}

/// Apply a mutation and push the strip to the sink. A failure at either
/// step leaves the controller as it was.
fn rendered<T>(
    controller: &mut Controller,
    change: impl FnOnce(&mut Controller) -> StripResult<T>,
) -> Result<T, ApiError> {
    Ok(controller.commit(change)?)
}
