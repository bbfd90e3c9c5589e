//! Shared core types used across the parser, orchestrator and host layers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Action-specific configuration payload.
///
/// The orchestrator never looks inside it; only the action registered for
/// the matching kind knows its shape.
pub type ActionConfig = serde_json::Value;

/// Identifier naming a category of declared side effect (e.g. `Copy`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionKind(String);

impl ActionKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ActionKind {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ActionKind {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Version or source reference of a package instance.
///
/// Semantic versions are parsed so plans can describe the direction of an
/// update; anything else (branch aliases, paths) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PackageReference {
    Version(semver::Version),
    Opaque(String),
}

impl PackageReference {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let candidate = trimmed.strip_prefix('v').unwrap_or(trimmed);
        match semver::Version::parse(candidate) {
            Ok(version) => Self::Version(version),
            Err(_) => Self::Opaque(trimmed.to_string()),
        }
    }

    pub fn version(&self) -> Option<&semver::Version> {
        match self {
            Self::Version(v) => Some(v),
            Self::Opaque(_) => None,
        }
    }
}

impl fmt::Display for PackageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version(v) => write!(f, "{v}"),
            Self::Opaque(s) => f.write_str(s),
        }
    }
}

impl From<String> for PackageReference {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PackageReference> for String {
    fn from(value: PackageReference) -> Self {
        value.to_string()
    }
}

/// Identity of one package instance, used for logging and ownership keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageIdentity {
    name: String,
    reference: PackageReference,
}

impl PackageIdentity {
    pub fn new(name: impl Into<String>, reference: PackageReference) -> Self {
        Self {
            name: name.into(),
            reference,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference(&self) -> &PackageReference {
        &self.reference
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.reference)
    }
}

/// How the reference changes between two instances of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateDirection {
    Upgrade,
    Downgrade,
    Reinstall,
    Change,
}

impl UpdateDirection {
    pub fn between(initial: &PackageReference, target: &PackageReference) -> Self {
        match (initial.version(), target.version()) {
            (Some(from), Some(to)) if to > from => Self::Upgrade,
            (Some(from), Some(to)) if to < from => Self::Downgrade,
            (Some(_), Some(_)) => Self::Reinstall,
            _ if initial == target => Self::Reinstall,
            _ => Self::Change,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upgrade => "upgrade",
            Self::Downgrade => "downgrade",
            Self::Reinstall => "reinstall",
            Self::Change => "change",
        }
    }
}
