//! Configuration for the schema tool
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-tool.toml)
//! - Environment variables (SCHEMA_TOOL__*)
//!
//! ## Example config file (schema-tool.toml):
//! ```toml
//! [output]
//! format = "compact"
//! include_fingerprints = true
//!
//! [definitions]
//! sanitize_names = false
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Main configuration for the schema tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Definition loading settings
    #[serde(default)]
    pub definitions: DefinitionsConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format (pretty or compact)
    #[serde(default)]
    pub format: OutputFormat,

    /// Print each schema's fingerprint
    #[serde(default = "default_true")]
    pub include_fingerprints: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// How definition documents become builders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionsConfig {
    /// Sanitize entry names, keeping the original as the raw name.
    /// When off, unsanitized names are rejected by the entry builder.
    #[serde(default = "default_true")]
    pub sanitize_names: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pretty,
            include_fingerprints: true,
        }
    }
}

impl Default for DefinitionsConfig {
    fn default() -> Self {
        Self { sanitize_names: true }
    }
}

impl OutputFormat {
    /// Render a JSON value in this format
    pub fn render(&self, value: &serde_json::Value) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

impl ToolConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, with an optional explicit file layered on top
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-tool.toml",
            ".schema-tool.toml",
            "config/schema-tool.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "record-schema", "schema-tool") {
            let xdg_config = config_dir.config_dir().join("schema-tool.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_TOOL")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ToolConfig::default();
        assert_eq!(config.output.format, OutputFormat::Pretty);
        assert!(config.output.include_fingerprints);
        assert!(config.definitions.sanitize_names);
    }

    #[test]
    fn test_serialize_config() {
        let config = ToolConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("[definitions]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.toml");
        std::fs::write(
            &path,
            "[output]\nformat = \"compact\"\n\n[definitions]\nsanitize_names = false\n",
        )
        .unwrap();

        let config = ToolConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.output.format, OutputFormat::Compact);
        assert!(config.output.include_fingerprints);
        assert!(!config.definitions.sanitize_names);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = ToolConfig::default();
        config.output.include_fingerprints = false;
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = ToolConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert!(!loaded.output.include_fingerprints);
    }

    #[test]
    fn test_render_formats() {
        let value = serde_json::json!({"a": 1});
        assert_eq!(OutputFormat::Compact.render(&value).unwrap(), "{\"a\":1}");
        assert!(OutputFormat::Pretty.render(&value).unwrap().contains('\n'));
    }
}
