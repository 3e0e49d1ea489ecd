//! Configuration loader implementation

use crate::resolve::ResolvedEnvironment;
use crate::schema::DeploymentConfig;
use crate::validation::ConfigValidator;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment, Source,
};
use std::path::Path;
use tracing::{debug, info, warn};
use types::{ConfigError, DeployError, Environment, Result};

/// Prefix of environment variables overriding declaration keys
pub const ENV_PREFIX: &str = "WPDEPLOY_";

/// Keys whose environment overrides are taken verbatim.
///
/// The `Env` provider parses values, which turns a password of `007` into `7`
/// and rejects `[abc]`; these keys are merged as plain strings instead.
const RAW_ENV_KEYS: [&str; 9] = [
    "remote.host",
    "remote.user",
    "database.live_name",
    "database.live_user",
    "database.live_password",
    "database.staging_name",
    "database.staging_user",
    "database.staging_password",
    "database.staging_host",
];

/// Environment variable overriding a dotted declaration key
pub fn env_var_name(key: &str) -> String {
    format!("{}{}", ENV_PREFIX, key.to_uppercase().replace('.', "__"))
}

/// Configuration loader that handles YAML declarations and environment variables
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a declaration from file, with `WPDEPLOY_*` environment overrides
    ///
    /// Keys are addressed as `WPDEPLOY_<SECTION>__<KEY>`, for example
    /// `WPDEPLOY_DATABASE__LIVE_PASSWORD`. Fails on the first path or
    /// environment-independent field that is invalid.
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<DeploymentConfig> {
        let config_path = config_path.as_ref();
        let config = Self::read(config_path)?;

        Self::validate(&config)?;

        info!(path = %config_path.display(), staging = config.has_staging(), "Loaded deployment configuration");
        Ok(config)
    }

    /// Parse a declaration without validating it, for collecting lint passes
    pub fn read<P: AsRef<Path>>(config_path: P) -> Result<DeploymentConfig> {
        let config_path = config_path.as_ref();

        if !config_path.exists() {
            return Err(ConfigError::FileNotFound {
                path: config_path.display().to_string(),
            });
        }

        let mut figment = Figment::new().merge(Yaml::file(config_path)).merge(
            Env::prefixed(ENV_PREFIX)
                .ignore(&["config"])
                .split("__")
                .filter(|key| !RAW_ENV_KEYS.iter().any(|raw| key.as_str().eq_ignore_ascii_case(raw))),
        );
        for key in RAW_ENV_KEYS {
            if let Ok(value) = std::env::var(env_var_name(key)) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }

        let config: DeploymentConfig = figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Self::warn_inline_secrets(&figment, &config);
        Ok(config)
    }

    /// Load configuration from string (for testing)
    pub fn load_from_str(yaml_content: &str) -> Result<DeploymentConfig> {
        let config: DeploymentConfig = Figment::new()
            .merge(Yaml::string(yaml_content))
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load a declaration and resolve it for `environment`
    pub fn load_for<P: AsRef<Path>>(config_path: P, environment: Environment) -> Result<ResolvedEnvironment> {
        Self::load(config_path)?.resolve(environment)
    }

    /// Fail on the first environment-independent problem
    fn validate(config: &DeploymentConfig) -> Result<()> {
        let report = ConfigValidator::validate_declaration(config);
        for warning in &report.warnings {
            debug!(field = %warning.field, "{}", warning.message);
        }
        report.into_result()
    }

    fn warn_inline_secrets(figment: &Figment, config: &DeploymentConfig) {
        let secrets = [
            ("database.live_password", Some(config.database.live_password.as_str())),
            ("database.staging_password", config.database.staging_password.as_deref()),
        ];

        for (key, value) in secrets {
            if value.map_or(true, str::is_empty) {
                continue;
            }

            let from_file = figment
                .find_metadata(key)
                .map_or(false, |meta| matches!(meta.source, Some(Source::File(_))));
            if from_file {
                warn!(
                    field = key,
                    "Password is stored in the declaration file, consider {} instead",
                    env_var_name(key)
                );
            }
        }
    }

    /// Get default configuration
    pub fn default() -> DeploymentConfig {
        DeploymentConfig::default()
    }

    /// Create example configuration file
    pub fn create_example<P: AsRef<Path>>(path: P, staging: bool) -> std::result::Result<(), DeployError> {
        let config = if staging {
            DeploymentConfig::with_staging()
        } else {
            Self::default()
        };
        let yaml_content = serde_yaml::to_string(&config)?;

        std::fs::write(path.as_ref(), yaml_content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use tempfile::NamedTempFile;

    const LIVE_YAML: &str = r#"
remote:
  host: "example.com"
  user: "deploy"
  live_path: "~/public_html"
domain:
  dev: "http://www.samplesite.ldev"
  live: "https://www.samplesite.com"
database:
  live_name: "wp"
  live_user: "wp_user"
  live_password: "s3cret"
theme:
  dev_folder: "mytheme"
  remote_folder: "mytheme"
"#;

    #[test]
    fn test_load_default_config() {
        let config = ConfigLoader::default();
        assert_eq!(config.database.remote_path, "~/backup");
        assert_eq!(config.uploads.remote_path, "/wp-content/uploads");
        assert!(!config.has_staging());
    }

    #[test]
    fn test_load_from_string() {
        let config = ConfigLoader::load_from_str(LIVE_YAML).unwrap();
        assert_eq!(config.remote.host, "example.com");
        assert_eq!(config.database.live_host, "127.0.0.1");
        assert_eq!(config.theme.dev_path, "./wp-content/themes");

        let view = config.resolve(Environment::Live).unwrap();
        assert_eq!(view.remote.unwrap().database.name, "wp");
    }

    #[test]
    fn test_wp_path_alias() {
        let yaml = LIVE_YAML.replace("live_path:", "wp_path:");
        let config = ConfigLoader::load_from_str(&yaml).unwrap();
        assert_eq!(config.remote.live_path, "~/public_html");
    }

    #[test]
    fn test_numeric_credentials_are_strings() {
        let yaml = LIVE_YAML.replace("\"s3cret\"", "12345");
        let config = ConfigLoader::load_from_str(&yaml).unwrap();
        assert_eq!(config.database.live_password, "12345");
    }

    #[test]
    fn test_trailing_slash_is_invalid_path() {
        let yaml = r#"
theme:
  dev_path: "./wp-content/themes/"
  dev_folder: "mytheme"
"#;
        let err = ConfigLoader::load_from_str(yaml).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidPath {
                field: "theme.dev_path".to_string(),
                path: "./wp-content/themes/".to_string(),
                reason: "trailing path separator".to_string(),
            }
        );
    }

    #[test]
    fn test_trailing_slash_rejected_on_every_path_field() {
        let template = DeploymentConfig::with_staging();
        let names: Vec<_> = template.path_fields().iter().map(|f| f.name).collect();
        assert_eq!(names.len(), 17);

        for name in names {
            let (section, key) = name.split_once('.').unwrap();
            let mut value = serde_yaml::to_value(&template).unwrap();
            let current = value[section][key].as_str().unwrap_or_default().to_string();
            value[section][key] = serde_yaml::Value::String(format!("{}/", current));

            let yaml = serde_yaml::to_string(&value).unwrap();
            let err = ConfigLoader::load_from_str(&yaml).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidPath { ref field, .. } if field == name),
                "{}: {:?}",
                name,
                err
            );
        }
    }

    #[test]
    fn test_wrong_convention_is_invalid_path() {
        let yaml = r#"
remote:
  live_path: "public_html"
theme:
  dev_folder: "mytheme"
"#;
        let err = ConfigLoader::load_from_str(yaml).unwrap_err();
        assert_eq!(err.field(), Some("remote.live_path"));

        let yaml = r#"
uploads:
  dev_path: "/var/www/wp-content/uploads"
theme:
  dev_folder: "mytheme"
"#;
        let err = ConfigLoader::load_from_str(yaml).unwrap_err();
        assert_eq!(err.field(), Some("uploads.dev_path"));
    }

    #[test]
    fn test_blank_local_field_is_missing() {
        let yaml = r#"
theme:
  dev_folder: ""
"#;
        let err = ConfigLoader::load_from_str(yaml).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingField {
                field: "theme.dev_folder".to_string()
            }
        );
    }

    #[test]
    fn test_parse_error() {
        let err = ConfigLoader::load_from_str("remote: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_for_target() {
        // Jail serializes tests that read WPDEPLOY_* variables
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", LIVE_YAML)?;

            let view = ConfigLoader::load_for("config.yaml", Environment::Live).map_err(|e| e.to_string())?;
            assert_eq!(view.remote.unwrap().ssh_destination(), "deploy@example.com");

            let err = ConfigLoader::load_for("config.yaml", Environment::Staging).unwrap_err();
            assert!(matches!(err, ConfigError::EnvironmentNotConfigured { .. }));
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_secret() {
        Jail::expect_with(|jail| {
            let yaml = LIVE_YAML.replace("  live_password: \"s3cret\"\n", "");
            jail.create_file("config.yaml", &yaml)?;
            jail.set_env("WPDEPLOY_DATABASE__LIVE_PASSWORD", "from-env");
            jail.set_env("WPDEPLOY_REMOTE__HOST", "live.example.com");
            jail.set_env("WPDEPLOY_DATABASE__LIVE_USER", "4242");

            let view = ConfigLoader::load_for("config.yaml", Environment::Live).map_err(|e| e.to_string())?;
            let remote = view.remote.expect("live view has a remote side");
            assert_eq!(remote.database.password, "from-env");
            assert_eq!(remote.host, "live.example.com");
            assert_eq!(remote.database.user, "4242");
            Ok(())
        });
    }

    #[test]
    fn test_read_skips_validation() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "theme:\n  dev_path: \"./wp-content/themes/\"\n")?;

            let config = ConfigLoader::read("config.yaml").map_err(|e| e.to_string())?;
            assert_eq!(config.theme.dev_path, "./wp-content/themes/");
            assert!(ConfigLoader::load("config.yaml").is_err());
            Ok(())
        });
    }

    #[test]
    fn test_environment_secrets_are_taken_verbatim() {
        Jail::expect_with(|jail| {
            let yaml = LIVE_YAML.replace("  live_password: \"s3cret\"\n", "");
            jail.create_file("config.yaml", &yaml)?;

            for password in ["007", "1.50", "[abc]", "true", "p@ss word"] {
                jail.set_env("WPDEPLOY_DATABASE__LIVE_PASSWORD", password);
                let view = ConfigLoader::load_for("config.yaml", Environment::Live).map_err(|e| e.to_string())?;
                assert_eq!(view.remote.unwrap().database.password, password);
            }

            jail.set_env("WPDEPLOY_DATABASE__LIVE_USER", "0042");
            let config = ConfigLoader::load("config.yaml").map_err(|e| e.to_string())?;
            assert_eq!(config.database.live_user, "0042");
            Ok(())
        });
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("database.live_password"), "WPDEPLOY_DATABASE__LIVE_PASSWORD");
        assert_eq!(env_var_name("remote.host"), "WPDEPLOY_REMOTE__HOST");
    }

    #[test]
    fn test_create_example() {
        let temp_file = NamedTempFile::new().unwrap();
        ConfigLoader::create_example(temp_file.path(), false).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("remote:"));
        assert!(content.contains("excludes:"));
        assert!(!content.contains("staging"));

        // The template is blank, so it loads only up to the first empty field
        let err = ConfigLoader::load(temp_file.path()).unwrap_err();
        assert_eq!(err.field(), Some("theme.dev_folder"));
    }

    #[test]
    fn test_create_staging_example() {
        let temp_file = NamedTempFile::new().unwrap();
        ConfigLoader::create_example(temp_file.path(), true).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("staging_path:"));
        assert!(content.contains("staging_host:"));
        assert!(content.contains("127.0.0.1"));
    }
}
