//! Configuration management for locdoc.
//!
//! Parses `locdoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! The site itself (locales, navigation, sidebars, footer) is described either
//! inline in a `[site]` table or in a separate document referenced by
//! `docs.site_config` (TOML, YAML or JSON). It is handed out untyped by
//! [`Config::site_document`]; validation belongs to `locdoc-site`.
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `docs.source_dir`
//! - `docs.site_config`
//! - `build.output`

mod expand;
mod site;

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use site::SiteFormat;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override site configuration document.
    pub site_config: Option<PathBuf>,
    /// Override site model output path.
    pub output: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "locdoc.toml";

/// Project data directory, relative to the config file.
const PROJECT_DIRNAME: &str = ".locdoc";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Build configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,
    /// Inline site configuration.
    site: Option<toml::Table>,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    site_config: Option<String>,
}

/// Raw build configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    output: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Source directory for markdown files.
    pub source_dir: PathBuf,
    /// Project directory for locdoc data (.locdoc/).
    pub project_dir: PathBuf,
    /// Separate site configuration document, if any.
    pub site_config: Option<PathBuf>,
    /// Where `locdoc build` writes the site model.
    pub output: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Site document with an unknown extension.
    #[error(
        "Unsupported site configuration format: {} (expected .toml, .yaml, .yml or .json)",
        .0.display()
    )]
    UnsupportedFormat(PathBuf),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`docs.source_dir`").
        field: String,
        /// Error message (e.g., "${`DOCS_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `locdoc.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string, resolving paths against `base`.
    pub fn from_toml_str(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(site_config) = &settings.site_config {
            self.docs_resolved.site_config = Some(site_config.clone());
        }
        if let Some(output) = &settings.output {
            self.docs_resolved.output.clone_from(output);
        }
    }

    /// Load the raw site configuration document.
    ///
    /// A separate `docs.site_config` file wins over an inline `[site]` table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if neither source is configured, or a
    /// parse/I/O error from reading the separate document.
    pub fn site_document(&self) -> Result<serde_json::Value, ConfigError> {
        if let Some(path) = &self.docs_resolved.site_config {
            return site::load_site_document(path);
        }
        match &self.site {
            Some(table) => Ok(serde_json::to_value(table)?),
            None => Err(ConfigError::Validation(
                "no site configuration: add a [site] table or set docs.site_config".to_owned(),
            )),
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let project_dir = base.join(PROJECT_DIRNAME);
        Self {
            docs: DocsConfigRaw::default(),
            build: BuildConfigRaw::default(),
            site: None,
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                output: project_dir.join("site.json"),
                project_dir,
                site_config: None,
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml_str(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(source_dir) = &self.docs.source_dir {
            require_non_empty(source_dir, "docs.source_dir")?;
        }
        if let Some(site_config) = &self.docs.site_config {
            require_non_empty(site_config, "docs.site_config")?;
            if self.site.is_some() {
                return Err(ConfigError::Validation(
                    "docs.site_config and an inline [site] table are mutually exclusive"
                        .to_owned(),
                ));
            }
            if SiteFormat::from_path(Path::new(site_config)).is_none() {
                return Err(ConfigError::UnsupportedFormat(PathBuf::from(site_config)));
            }
        }
        if let Some(output) = &self.build.output {
            require_non_empty(output, "build.output")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.docs.source_dir, "docs.source_dir")?;
        expand::expand_opt(&mut self.docs.site_config, "docs.site_config")?;
        expand::expand_opt(&mut self.build.output, "build.output")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let project_dir = config_dir.join(PROJECT_DIRNAME);
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or("docs")),
            site_config: self.docs.site_config.as_deref().map(|p| config_dir.join(p)),
            output: match self.build.output.as_deref() {
                Some(output) => config_dir.join(output),
                None => project_dir.join("site.json"),
            },
            project_dir,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
        assert_eq!(
            config.docs_resolved.project_dir,
            PathBuf::from("/test/.locdoc")
        );
        assert_eq!(
            config.docs_resolved.output,
            PathBuf::from("/test/.locdoc/site.json")
        );
        assert!(config.docs_resolved.site_config.is_none());
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_toml_str("", Path::new("/project")).unwrap();
        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/docs")
        );
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
source_dir = "documentation"
site_config = "config/site.yaml"

[build]
output = "dist/site.json"
"#;
        let config = Config::from_toml_str(toml, Path::new("/project")).unwrap();

        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/documentation")
        );
        assert_eq!(
            config.docs_resolved.site_config,
            Some(PathBuf::from("/project/config/site.yaml"))
        );
        assert_eq!(
            config.docs_resolved.output,
            PathBuf::from("/project/dist/site.json")
        );
        assert_eq!(
            config.docs_resolved.project_dir,
            PathBuf::from("/project/.locdoc")
        );
    }

    #[test]
    fn test_inline_site_document() {
        let toml = r#"
[site]
title = "Egg"

[site.locales."/"]
lang = "en-US"

[site.locales."/".sidebar]
"/guide/" = [["./", "Description"], "egg"]
"#;
        let config = Config::from_toml_str(toml, Path::new("/project")).unwrap();
        let site = config.site_document().unwrap();

        assert_eq!(site["title"], "Egg");
        assert_eq!(site["locales"]["/"]["lang"], "en-US");
        assert_eq!(
            site["locales"]["/"]["sidebar"]["/guide/"],
            serde_json::json!([["./", "Description"], "egg"])
        );
    }

    #[test]
    fn test_site_document_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("site.yaml"),
            "locales:\n  /:\n    lang: en-US\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[docs]\nsite_config = \"site.yaml\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&dir.path().join(CONFIG_FILENAME)), None).unwrap();
        let site = config.site_document().unwrap();
        assert_eq!(site["locales"]["/"]["lang"], "en-US");
        assert_eq!(
            config.config_path,
            Some(dir.path().join(CONFIG_FILENAME))
        );
    }

    #[test]
    fn test_site_document_missing() {
        let config = Config::default_with_base(Path::new("/test"));
        let err = config.site_document().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("[site]"));
    }

    #[test]
    fn test_load_explicit_missing_path() {
        let err = Config::load(Some(Path::new("/nonexistent/locdoc.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_validate_site_sources_exclusive() {
        let toml = r#"
[docs]
site_config = "site.yaml"

[site]
title = "Egg"
"#;
        let err = Config::from_toml_str(toml, Path::new("/project")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn test_validate_unsupported_site_format() {
        let toml = r#"
[docs]
site_config = "config.js"
"#;
        let err = Config::from_toml_str(toml, Path::new("/project")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_validate_empty_source_dir() {
        let toml = r#"
[docs]
source_dir = ""
"#;
        let err = Config::from_toml_str(toml, Path::new("/project")).unwrap_err();
        assert!(err.to_string().contains("docs.source_dir"));
    }

    #[test]
    fn test_apply_cli_settings_source_dir() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            source_dir: Some(PathBuf::from("/custom/docs")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/custom/docs")
        );
        assert_eq!(
            config.docs_resolved.project_dir,
            PathBuf::from("/test/.locdoc")
        ); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_multiple() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            site_config: Some(PathBuf::from("/elsewhere/site.json")),
            output: Some(PathBuf::from("/out/model.json")),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(
            config.docs_resolved.site_config,
            Some(PathBuf::from("/elsewhere/site.json"))
        );
        assert_eq!(config.docs_resolved.output, PathBuf::from("/out/model.json"));
        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/test/docs"));
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let before = Config::default_with_base(Path::new("/test"));
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.docs_resolved.source_dir, before.docs_resolved.source_dir);
        assert_eq!(config.docs_resolved.output, before.docs_resolved.output);
        assert_eq!(config.docs_resolved.site_config, before.docs_resolved.site_config);
    }

    #[test]
    fn test_expand_env_vars_source_dir() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("LOCDOC_TEST_DOCS_DIR", "content");
        }

        let toml = r#"
[docs]
source_dir = "${LOCDOC_TEST_DOCS_DIR}"
"#;
        let config = Config::from_toml_str(toml, Path::new("/project")).unwrap();
        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/content")
        );

        unsafe {
            std::env::remove_var("LOCDOC_TEST_DOCS_DIR");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("LOCDOC_TEST_MISSING_OUTPUT");
        }

        let toml = r#"
[build]
output = "${LOCDOC_TEST_MISSING_OUTPUT}"
"#;
        let err = Config::from_toml_str(toml, Path::new("/project")).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("build.output"));
    }
}
