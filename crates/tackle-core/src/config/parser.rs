//! TOML parser with helpful error messages

use super::schema::TackleConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse tackle.toml with detailed error messages
pub fn parse_tackle_toml(path: &Path) -> Result<TackleConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_tackle_toml_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse tackle.toml content from string
pub fn parse_tackle_toml_str(content: &str) -> Result<TackleConfig> {
    let config: TackleConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    config.validate()?;

    Ok(config)
}

fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let error_msg = error.to_string();

    let line_hint = error_msg
        .lines()
        .find(|line| line.contains("line "))
        .and_then(|line| {
            line.split("line ")
                .nth(1)
                .and_then(|s| s.split_whitespace().next())
                .and_then(|s| s.parse::<usize>().ok())
        });

    if let Some(line_num) = line_hint {
        let context = get_line_context(content, line_num);
        anyhow::anyhow!(
            "TOML parsing error at line {}:\n{}\n\nError: {}",
            line_num,
            context,
            error_msg
        )
    } else {
        anyhow::anyhow!("TOML parsing error: {}", error_msg)
    }
}

/// Context lines around an error, with the failing line marked
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2).min(lines.len());
    let end = (line_num + 2).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize a configuration to TOML string
pub fn to_toml(config: &TackleConfig) -> Result<String> {
    toml::to_string_pretty(config).with_context(|| "Failed to serialize configuration to TOML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
vendor_dir = "packages"
state_dir = "var/tackle"
supported_types = ["acme-extension"]

[shared]
registry = "etc/registry.json"
target_root = "web"
"#;

        let config = parse_tackle_toml_str(toml).unwrap();
        assert_eq!(config.vendor_dir, "packages");
        assert_eq!(config.state_dir, "var/tackle");
        assert_eq!(config.supported_types, vec!["acme-extension".to_string()]);
        let shared = config.shared.unwrap();
        assert_eq!(shared.registry, "etc/registry.json");
        assert_eq!(shared.target_root, "web");
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_tackle_toml_str("").unwrap();
        assert_eq!(config, TackleConfig::default());
        assert!(config.shared.is_none());
    }

    #[test]
    fn test_empty_shared_section_gets_defaults() {
        let config = parse_tackle_toml_str("[shared]\n").unwrap();
        assert_eq!(config.shared, Some(crate::config::SharedConfig::default()));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = parse_tackle_toml_str("[shared\nregistry = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_traversal_in_paths() {
        let err = parse_tackle_toml_str("vendor_dir = \"../outside\"").unwrap_err();
        assert!(format!("{err:#}").contains("Invalid vendor_dir"));

        let err = parse_tackle_toml_str("[shared]\ntarget_root = \"/var/www\"").unwrap_err();
        assert!(format!("{err:#}").contains("Invalid shared.target_root"));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let original = TackleConfig {
            supported_types: vec!["acme-extension".to_string()],
            ..TackleConfig::initial()
        };

        let toml_str = to_toml(&original).unwrap();
        assert_eq!(parse_tackle_toml_str(&toml_str).unwrap(), original);
    }

    #[test]
    fn test_parse_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "state_dir = \".state\"").unwrap();

        let config = parse_tackle_toml(temp_file.path()).unwrap();
        assert_eq!(config.state_dir, ".state");
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = parse_tackle_toml(Path::new("/nonexistent/path/tackle.toml"));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    fn test_line_context_marks_failing_line() {
        let context = get_line_context("a = 1\nb = \nc = 3", 2);
        assert!(context.contains(">>>    2 | b = "));
    }
}
