//! Configuration loading from files.
//!
//! The YAML file is layered with `POSTSMITH_`-prefixed environment
//! variables, `__` separating nested keys (`POSTSMITH_BUILD__OUTPUT=public`).

use std::path::{Path, PathBuf};

use super::{Config, ConfigError};

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = "site.yaml";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "POSTSMITH";

impl Config {
    /// Load the config from the command line argument, defaulting to `site.yaml`
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new(CONFIG_FILE_NAME));
        let config_file = if config_file.is_relative() {
            std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file)
        } else {
            config_file.to_path_buf()
        };

        Self::load_from_file(&config_file)
    }

    /// Load the config from a file path, apply overrides and normalize.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let path_str = path
            .as_os_str()
            .to_str()
            .ok_or_else(|| ConfigError::EncodePath(path.to_path_buf()))?;

        let mut config = config::Config::builder()
            .add_source(config::File::new(path_str, config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Config>()?;

        config.validate()?;
        config.site.normalize();

        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse a config from YAML text without environment overrides.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let mut config = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Yaml))
            .build()?
            .try_deserialize::<Config>()?;

        config.validate()?;
        config.site.normalize();
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.site.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'site.name' must not be empty".to_string(),
            ));
        }
        if self.site.url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "invalid config: 'site.url' must not be empty\n\nExample:\n  site:\n    name: My Blog\n    url: https://example.com".to_string(),
            ));
        }
        if !is_absolute_url(self.site.url.trim()) {
            return Err(ConfigError::Validation(format!(
                "invalid config: 'site.url' must be an absolute URL with a scheme, got '{}'\n\nExample:\n  site:\n    url: https://example.com",
                self.site.url.trim()
            )));
        }
        Ok(())
    }

    /// Source root, resolved against the config file's directory.
    pub fn source_dir(&self, base_path: &Path) -> PathBuf {
        resolve(base_path, &self.build.source)
    }

    /// Output root, resolved against the config file's directory.
    pub fn output_dir(&self, base_path: &Path) -> PathBuf {
        resolve(base_path, &self.build.output)
    }
}

/// `scheme://host...` with an RFC 3986 scheme and a non-empty remainder.
fn is_absolute_url(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    let valid_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid_scheme && !rest.trim_matches('/').is_empty()
}

fn resolve(base_path: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base_path.join(path)
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = "site:\n  name: My Blog\n  url: https://example.com/\n";

    #[test]
    fn test_minimal_config_defaults() {
        let config = Config::from_yaml(MINIMAL).unwrap();

        assert_eq!(config.site.name, "My Blog");
        assert_eq!(config.site.url, "https://example.com");
        assert_eq!(config.site.language, "en");
        assert_eq!(config.site.cdn, None);
        assert_eq!(config.site.description(), "My Blog");
        assert_eq!(config.build.output, PathBuf::from("_site"));
        assert!(config.menu.is_empty());
        assert_eq!(config.markdown.highlight_theme, "github-dark");
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
site:
  name: My Blog
  url: https://example.com
  language: de
  cdn: https://cdn.example.com/
  description: Notes and essays
build:
  source: content
  output: public
  static_folders: [css, images]
  cookie_notice: true
  footer: "(c) Me"
menu:
  - text: Home
    link: /
  - text: About
    link: /about.html
markdown:
  extensions: [tables]
"#;
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.site.cdn.as_deref(), Some("https://cdn.example.com"));
        assert_eq!(config.site.description(), "Notes and essays");
        assert_eq!(config.build.static_folders, vec!["css", "images"]);
        assert!(config.build.cookie_notice);
        assert!(!config.build.include_hidden);
        assert_eq!(config.menu.len(), 2);
        assert_eq!(config.menu[1].link, "/about.html");
        assert_eq!(config.markdown.extensions, vec!["tables"]);
    }

    #[test]
    fn test_missing_url_is_rejected() {
        let err = Config::from_yaml("site:\n  name: My Blog\n  url: \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("site.url")));
    }

    #[test]
    fn test_url_without_scheme_is_rejected() {
        let err = Config::from_yaml("site:\n  name: My Blog\n  url: example.com\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("absolute URL")));

        assert!(Config::from_yaml("site:\n  name: My Blog\n  url: \"https://\"\n").is_err());
        assert!(Config::from_yaml("site:\n  name: My Blog\n  url: http://localhost:8080\n").is_ok());
    }

    #[test]
    fn test_missing_site_section() {
        assert!(matches!(
            Config::from_yaml("menu: []\n"),
            Err(ConfigError::Deserialize(_))
        ));
    }

    #[test]
    fn test_load_from_file_resolves_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, format!("{MINIMAL}build:\n  output: /tmp/out\n")).unwrap();

        let config = Config::load_from_file(&path).unwrap();

        assert_eq!(config.source_dir(dir.path()), dir.path().join("."));
        assert_eq!(config.output_dir(dir.path()), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load_from_file(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
