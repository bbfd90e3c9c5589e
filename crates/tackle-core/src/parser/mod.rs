//! Extracts the declared action map from package metadata.
//!
//! Actions live under `extra.actions` of the descriptor, as an object whose
//! keys are action kinds in declaration order.

use serde_json::Value;
use thiserror::Error;

use crate::action::ActionMap;
use crate::package::PackageDescriptor;
use crate::types::ActionKind;

/// Key under `extra` holding the action declarations.
pub const ACTIONS_KEY: &str = "actions";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Malformed metadata for {package}: 'extra' must be an object, found {found}")]
    MalformedExtra { package: String, found: &'static str },

    #[error("Malformed metadata for {package}: 'extra.actions' must be an object, found {found}")]
    MalformedActions { package: String, found: &'static str },

    #[error("Malformed metadata for {package}: action kind cannot be empty")]
    EmptyActionKind { package: String },
}

/// Parse the action declarations of a package.
///
/// Pure and deterministic; missing declarations yield an empty map.
pub fn parse(package: &PackageDescriptor) -> Result<ActionMap, ParseError> {
    let extra = match &package.extra {
        Value::Null => return Ok(ActionMap::new()),
        Value::Object(extra) => extra,
        other => {
            return Err(ParseError::MalformedExtra {
                package: package.name.clone(),
                found: json_type(other),
            });
        }
    };

    let actions = match extra.get(ACTIONS_KEY) {
        None | Some(Value::Null) => return Ok(ActionMap::new()),
        Some(Value::Object(actions)) => actions,
        Some(other) => {
            return Err(ParseError::MalformedActions {
                package: package.name.clone(),
                found: json_type(other),
            });
        }
    };

    let mut map = ActionMap::new();
    for (kind, config) in actions {
        if kind.trim().is_empty() {
            return Err(ParseError::EmptyActionKind {
                package: package.name.clone(),
            });
        }
        map.insert(ActionKind::new(kind.as_str()), config.clone());
    }
    Ok(map)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
