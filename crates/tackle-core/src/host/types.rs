//! Package types handled by the action installer.

/// Package types supported out of the box.
pub const BUILTIN_TYPES: &[&str] = &["tackle-bundle", "tackle-app", "tackle-plugin", "tackle-theme"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedTypes {
    types: Vec<String>,
}

impl Default for SupportedTypes {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SupportedTypes {
    pub fn builtin() -> Self {
        Self {
            types: BUILTIN_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Built-in types plus `extra`, without duplicates.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut supported = Self::builtin();
        for ty in extra {
            let ty = ty.into();
            if !supported.types.contains(&ty) {
                supported.types.push(ty);
            }
        }
        supported
    }

    pub fn supports(&self, package_type: &str) -> bool {
        self.types.iter().any(|t| t == package_type)
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_types_supported() {
        let supported = SupportedTypes::builtin();
        assert!(supported.supports("tackle-app"));
        assert!(supported.supports("tackle-bundle"));
        assert!(!supported.supports("library"));
        assert!(!supported.supports(""));
    }

    #[test]
    fn test_extra_types_are_deduplicated() {
        let supported = SupportedTypes::with_extra(["acme-extension", "tackle-app"]);
        assert!(supported.supports("acme-extension"));
        assert_eq!(supported.types().len(), BUILTIN_TYPES.len() + 1);
    }
}
