use jsonschema::Validator;
use serde_json::Value;

/// One violated schema constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON pointer to the offending value, relative to the validated document.
    pub pointer: String,
    /// Validator message for the constraint.
    pub message: String,
}

impl Violation {
    /// Dotted path of the offending value under `root`.
    pub fn path(&self, root: &str) -> String {
        pointer_to_path(root, &self.pointer)
    }

    /// Render as `error in <path> : <message>`.
    pub fn describe(&self, root: &str) -> String {
        format!("error in {} : {}", self.path(root), self.message)
    }
}

/// Convert a JSON pointer into a dotted path rooted at `root`.
///
/// Array indices become `[n]`: `/sections/1/start` under `args` is
/// `args.sections[1].start`.
pub fn pointer_to_path(root: &str, pointer: &str) -> String {
    let mut path = String::from(root);
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            path.push('[');
            path.push_str(&segment);
            path.push(']');
        } else {
            path.push('.');
            path.push_str(&segment);
        }
    }
    path
}

pub(crate) fn collect_violations(validator: &Validator, value: &Value) -> Vec<Violation> {
    validator
        .iter_errors(value)
        .map(|err| Violation {
            pointer: err.instance_path().as_str().to_string(),
            message: err.to_string(),
        })
        .collect()
}
