use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::{json, Map, Value};
use stripctl_schema::{RegistryConfig, SchemaError, SchemaRegistry};
use stripctl_strip::Controller;
use tracing::{debug, error};

use crate::command::Outcome;
use crate::commands::{CommandSpec, COMMANDS};
use crate::error::{ApiError, ParseError};
use crate::response::Response;

/// Registry name of the top-level `{command, args}` schema.
pub const ENVELOPE_SCHEMA: &str = "request";

/// Result of dispatching one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub response: Response,
    /// The session should end once `response` has been sent.
    pub disconnect: bool,
}

impl Dispatched {
    fn reply(response: Response) -> Self {
        Self {
            response,
            disconnect: false,
        }
    }
}

/// Decodes, validates and executes request bodies against a command table.
pub struct Dispatcher {
    commands: &'static [CommandSpec],
    schemas: SchemaRegistry,
}

impl Dispatcher {
    /// Dispatcher over the built-in commands.
    pub fn new(config: RegistryConfig) -> Result<Self, SchemaError> {
        Self::with_commands(COMMANDS, config)
    }

    /// Compile the envelope schema and every command's args schema.
    pub fn with_commands(
        commands: &'static [CommandSpec],
        config: RegistryConfig,
    ) -> Result<Self, SchemaError> {
        let mut schemas = SchemaRegistry::with_config(config);
        schemas.register_value(ENVELOPE_SCHEMA, &envelope_schema(commands))?;
        for spec in commands {
            schemas.register(spec.name, spec.args_schema)?;
        }
        debug!(commands = commands.len(), strict = config.strict_mode, "dispatcher ready");
        Ok(Self { commands, schemas })
    }

    pub fn commands(&self) -> &'static [CommandSpec] {
        self.commands
    }

    /// Handle one request body and build its response.
    ///
    /// Never fails: every problem is reported in the response envelope.
    pub fn dispatch(&self, payload: &[u8], controller: &mut Controller) -> Dispatched {
        let (spec, args) = match self.parse(payload) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(error = %err, "rejected request");
                return Dispatched::reply(Response::from(&err));
            }
        };

        let mut command = (spec.build)();
        if let Err(err) = command.validate(&args) {
            debug!(command = spec.name, error = %err, "rejected arguments");
            return Dispatched::reply(Response::from(&err));
        }

        let executed = catch_unwind(AssertUnwindSafe(|| command.execute(controller)));
        let result = executed.unwrap_or_else(|panic| {
            let detail = panic_detail(panic.as_ref());
            error!(command = spec.name, panic = %detail, "command panicked");
            Err(ApiError::execution(format!("{} failed: {detail}", spec.name)))
        });

        match result {
            Ok(Outcome::Done) => Dispatched::reply(Response::ok(None)),
            Ok(Outcome::Result(value)) => Dispatched::reply(Response::ok(Some(value))),
            Ok(Outcome::Disconnect) => Dispatched {
                response: Response::accepted(),
                disconnect: true,
            },
            Err(err) => {
                debug!(command = spec.name, code = err.code().name(), error = %err, "command failed");
                Dispatched::reply(Response::from(&err))
            }
        }
    }

    fn parse(&self, payload: &[u8]) -> Result<(&'static CommandSpec, Value), ParseError> {
        let request: Value =
            serde_json::from_slice(payload).map_err(|err| ParseError::at("request", err))?;
        self.check(ENVELOPE_SCHEMA, &request, "request")?;

        let name = request
            .get("command")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let spec = self
            .commands
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| ParseError::at("request.command", format!("unknown command {name:?}")))?;

        let args = request
            .get("args")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        self.check(spec.name, &args, "args")?;
        Ok((spec, args))
    }

    fn check(&self, schema: &str, value: &Value, root: &str) -> Result<(), ParseError> {
        match self.schemas.validate(schema, value) {
            Ok(()) => Ok(()),
            Err(SchemaError::ValidationFailed { violations, .. }) => Err(ParseError::new(
                violations.iter().map(|v| v.describe(root)).collect(),
            )),
            Err(err) => Err(ParseError::at(root, err)),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.commands.len())
            .field("schemas", &self.schemas.names())
            .finish()
    }
}

fn envelope_schema(commands: &[CommandSpec]) -> Value {
    let names: Vec<&str> = commands.iter().map(|spec| spec.name).collect();
    json!({
        "type": "object",
        "properties": {
            "command": { "type": "string", "enum": names },
            "args": { "type": "object" }
        },
        "required": ["command"]
    })
}

fn panic_detail(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use stripctl_strip::{Color, FrameHandle, MemorySink};

    use super::*;
    use crate::command::Command;
    use crate::status::Status;

    fn setup(strip_length: usize) -> (Dispatcher, Controller, FrameHandle) {
        let sink = MemorySink::new();
        let frames = sink.handle();
        let controller = Controller::new(strip_length, Box::new(sink)).unwrap();
        (
            Dispatcher::new(RegistryConfig::default()).unwrap(),
            controller,
            frames,
        )
    }

    fn send(dispatcher: &Dispatcher, controller: &mut Controller, request: Value) -> Response {
        let body = serde_json::to_vec(&request).unwrap();
        dispatcher.dispatch(&body, controller).response
    }

    fn errors(response: &Response) -> Vec<String> {
        serde_json::from_value(response.result.as_ref().unwrap()["errors"].clone()).unwrap()
    }

    #[test]
    fn create_then_status() {
        let (dispatcher, mut ctl, frames) = setup(300);

        let created = send(
            &dispatcher,
            &mut ctl,
            json!({"command": "new_section", "args": {"start": 0, "end": 99, "color": "#ff0000"}}),
        );
        assert_eq!(created.status(), Some(Status::Ok));
        let id = created.result.unwrap()["id"].as_str().unwrap().to_string();

        let status = send(&dispatcher, &mut ctl, json!({"command": "status"}));
        let result = status.result.unwrap();
        assert_eq!(result["sections"][0]["id"], id);
        assert_eq!(result["sections"][0]["color"], "#ff0000");
        assert_eq!(result["sections"][0]["limits"], json!({"start": 0, "end": 99}));
        assert_eq!(frames.pixel(150), Some(Color::BLACK));
    }

    #[test]
    fn overlap_is_conflict_and_keeps_store() {
        let (dispatcher, mut ctl, _) = setup(300);
        let args = |start, end| {
            json!({"command": "new_section", "args": {"start": start, "end": end, "color": "#00f"}})
        };

        send(&dispatcher, &mut ctl, args(0, 99));
        let response = send(&dispatcher, &mut ctl, args(50, 150));

        assert_eq!(response.status, 409);
        assert_eq!(response.error_name(), Some("OVERLAP"));
        assert_eq!(ctl.store().len(), 1);
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let (dispatcher, mut ctl, _) = setup(10);
        let response = dispatcher.dispatch(b"{not json", &mut ctl).response;

        assert_eq!(response.status, 400);
        assert_eq!(response.error_name(), Some("PARSE_ERROR"));
        assert!(errors(&response)[0].starts_with("error in request : "));
    }

    #[test]
    fn empty_body_is_parse_error() {
        let (dispatcher, mut ctl, _) = setup(10);
        let response = dispatcher.dispatch(b"", &mut ctl).response;
        assert_eq!(response.error_name(), Some("PARSE_ERROR"));
    }

    #[test]
    fn unknown_command_names_the_command_path() {
        let (dispatcher, mut ctl, _) = setup(10);
        let response = send(&dispatcher, &mut ctl, json!({"command": "self_destruct"}));

        assert_eq!(response.status, 400);
        assert!(errors(&response)
            .iter()
            .any(|e| e.starts_with("error in request.command : ")));
    }

    #[test]
    fn missing_command_is_parse_error() {
        let (dispatcher, mut ctl, _) = setup(10);
        let response = send(&dispatcher, &mut ctl, json!({"args": {}}));
        assert_eq!(response.error_name(), Some("PARSE_ERROR"));
        assert_eq!(errors(&response).len(), 1);
    }

    #[test]
    fn argument_violations_name_their_paths() {
        let (dispatcher, mut ctl, _) = setup(300);
        let response = send(
            &dispatcher,
            &mut ctl,
            json!({"command": "add_sections", "args": {"sections": [
                {"start": 0, "end": 9, "color": "#fff"},
                {"start": -1, "end": 9, "color": 7}
            ]}}),
        );

        let errors = errors(&response);
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(errors.iter().any(|e| e.starts_with("error in args.sections[1].start : ")));
        assert!(errors.iter().any(|e| e.starts_with("error in args.sections[1].color : ")));
        assert!(ctl.store().is_empty());
    }

    #[test]
    fn args_default_to_empty_object() {
        let (dispatcher, mut ctl, _) = setup(10);
        let response = send(&dispatcher, &mut ctl, json!({"command": "turn_off"}));
        assert_eq!(response.status(), Some(Status::Ok));
        assert!(!ctl.is_on());
    }

    #[test]
    fn strict_mode_rejects_unknown_arguments() {
        let sink = MemorySink::new();
        let mut ctl = Controller::new(10, Box::new(sink)).unwrap();
        let request = serde_json::to_vec(
            &json!({"command": "turn_on", "args": {"section_id": "sec-1", "colour": "red"}}),
        )
        .unwrap();

        let strict = Dispatcher::new(RegistryConfig {
            strict_mode: true,
            ..RegistryConfig::default()
        })
        .unwrap();
        let response = strict.dispatch(&request, &mut ctl).response;
        assert_eq!(response.error_name(), Some("PARSE_ERROR"));

        let lenient = Dispatcher::new(RegistryConfig::default()).unwrap();
        let response = lenient.dispatch(&request, &mut ctl).response;
        assert_eq!(response.error_name(), Some("SECTION_NOT_FOUND"));
        assert_eq!(response.status, 404);
    }

    #[test]
    fn disconnect_is_accepted() {
        let (dispatcher, mut ctl, _) = setup(10);
        let dispatched = dispatcher.dispatch(br#"{"command":"disconnect"}"#, &mut ctl);

        assert!(dispatched.disconnect);
        assert_eq!(dispatched.response.status, 202);
        assert_eq!(dispatched.response.message, "Accepted");
    }

    #[derive(Default)]
    struct Explode;

    impl Command for Explode {
        fn validate(&mut self, _args: &Value) -> Result<(), ParseError> {
            Ok(())
        }

        fn execute(&self, _controller: &mut Controller) -> Result<Outcome, ApiError> {
            panic!("wire came loose")
        }
    }

    fn build_explode() -> Box<dyn Command> {
        Box::new(Explode)
    }

    static EXPLODING: &[CommandSpec] = &[CommandSpec {
        name: "explode",
        args_schema: r#"{ "type": "object" }"#,
        build: build_explode,
    }];

    #[test]
    fn panics_become_internal_errors() {
        let dispatcher = Dispatcher::with_commands(EXPLODING, RegistryConfig::default()).unwrap();
        let mut ctl = Controller::new(10, Box::new(MemorySink::new())).unwrap();

        let first = dispatcher.dispatch(br#"{"command":"explode"}"#, &mut ctl);
        assert_eq!(first.response.status, 500);
        assert_eq!(first.response.error_name(), Some("EXECUTION_ERROR"));
        assert!(first
            .response
            .description
            .as_deref()
            .unwrap()
            .contains("wire came loose"));
        assert!(!first.disconnect);

        let second = dispatcher.dispatch(br#"{"command":"explode"}"#, &mut ctl);
        assert_eq!(second.response.status, 500);
    }

    #[test]
    fn bad_schema_fails_construction() {
        static BROKEN: &[CommandSpec] = &[CommandSpec {
            name: "broken",
            args_schema: r#"{ "type": 12 }"#,
            build: build_explode,
        }];
        assert!(matches!(
            Dispatcher::with_commands(BROKEN, RegistryConfig::default()),
            Err(SchemaError::CompileFailed(_))
        ));
    }
}
