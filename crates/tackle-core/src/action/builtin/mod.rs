//! Built-in actions registered by default.

mod copy;
mod folders;
mod link;
mod register;

pub use copy::CopyAction;
pub use folders::FoldersAction;
pub use link::LinkAction;
pub use register::RegisterAction;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::ActionConfig;

/// A `{ "<source>": "<destination>" }` entry, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PathPair {
    pub source: String,
    pub destination: String,
}

pub(crate) fn parse_config<T: DeserializeOwned>(kind: &str, config: &ActionConfig) -> anyhow::Result<T> {
    T::deserialize(config).with_context(|| format!("Invalid configuration for action '{kind}'"))
}

pub(crate) fn parse_path_pairs(kind: &str, config: &ActionConfig) -> anyhow::Result<Vec<PathPair>> {
    let map = match config {
        Value::Object(map) => map,
        _ => anyhow::bail!(
            "Invalid configuration for action '{kind}': expected an object of source to destination paths"
        ),
    };
    map.iter()
        .map(|(source, destination)| match destination {
            Value::String(destination) => Ok(PathPair {
                source: source.clone(),
                destination: destination.clone(),
            }),
            _ => anyhow::bail!(
                "Invalid configuration for action '{kind}': destination for '{source}' must be a string"
            ),
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_pairs_keep_declaration_order() {
        let pairs = parse_path_pairs("Copy", &json!({"z.css": "a/z.css", "a.css": "b/a.css"})).unwrap();
        let sources: Vec<_> = pairs.iter().map(|p| p.source.as_str()).collect();
        assert_eq!(sources, vec!["z.css", "a.css"]);
    }

    #[test]
    fn path_pairs_reject_non_string_destination() {
        assert!(parse_path_pairs("Copy", &json!({"a": 1})).is_err());
        assert!(parse_path_pairs("Copy", &json!(["a"])).is_err());
    }
}
