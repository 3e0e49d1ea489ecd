//! Subcommand implementations

use anyhow::{Context, Result};
use clap::ValueEnum;
use config::{resolve_environment, ConfigLoader, ConfigValidator, ResolvedEnvironment, ValidationReport};
use std::path::Path;
use tracing::info;
use types::{DeployError, Environment};

/// Rendering of the resolved view
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Print the validation report; returns whether the declaration is valid
pub fn check(config_path: &Path, env: Option<&str>) -> Result<bool> {
    let config = ConfigLoader::read(config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;

    let report = match env {
        Some(tag) => {
            let environment: Environment = tag.parse()?;
            ConfigValidator::validate_environment(&config, environment)
        }
        None => ConfigValidator::validate(&config),
    };

    print!("{}", render_report(&report));
    info!("{}", report.summary());

    Ok(report.is_valid())
}

/// Print the resolved view of one environment
pub fn show(config_path: &Path, env: &str, format: OutputFormat, reveal_secrets: bool) -> Result<()> {
    let config = ConfigLoader::load(config_path).context("Failed to load configuration")?;
    let view = resolve_environment(&config, env).context("Failed to resolve environment")?;

    let view = if reveal_secrets { view } else { view.redacted() };
    print!("{}", render_view(&view, format)?);

    Ok(())
}

/// Write a blank declaration template
pub fn init(path: &Path, staging: bool, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(DeployError::AlreadyExists {
            path: path.display().to_string(),
        }
        .into());
    }

    ConfigLoader::create_example(path, staging)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), staging, "Wrote declaration template");
    Ok(())
}

fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();

    for error in &report.errors {
        out.push_str(&format!("error: {}\n", error));
    }
    for warning in &report.warnings {
        out.push_str(&format!("warning: {}: {}\n", warning.field, warning.message));
    }
    out.push_str(&report.summary());
    out.push('\n');

    out
}

fn render_view(view: &ResolvedEnvironment, format: OutputFormat) -> Result<String, DeployError> {
    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(view)?,
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(view)?;
            json.push('\n');
            json
        }
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::DeploymentConfig;
    use tempfile::TempDir;
    use types::ConfigError;

    fn live_config() -> DeploymentConfig {
        let mut config = DeploymentConfig::default();
        config.remote.host = "example.com".to_string();
        config.remote.user = "deploy".to_string();
        config.remote.live_path = "~/public_html".to_string();
        config.database.live_name = "wp".to_string();
        config.database.live_user = "wp_user".to_string();
        config.database.live_password = "s3cret".to_string();
        config.theme.dev_folder = "mytheme".to_string();
        config.theme.remote_folder = "mytheme".to_string();
        config
    }

    #[test]
    fn test_render_report() {
        let mut report = ValidationReport::new();
        report.add_error(ConfigError::MissingField {
            field: "remote.host".to_string(),
        });
        report.add_warning("domain.live", "Live domain should use HTTPS");

        assert_eq!(
            render_report(&report),
            "error: Missing required configuration field: remote.host\n\
             warning: domain.live: Live domain should use HTTPS\n\
             Validation: 1 errors, 1 warnings\n"
        );
    }

    #[test]
    fn test_render_view_masks_by_default() {
        let view = live_config().resolve(Environment::Live).unwrap();

        let yaml = render_view(&view.redacted(), OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("environment: live"));
        assert!(!yaml.contains("s3cret"));

        let json = render_view(&view, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["remote"]["database"]["password"], "s3cret");
        assert_eq!(value["remote"]["host"], "example.com");
        assert!(value.get("domain").is_none());
    }

    #[test]
    fn test_dev_view_has_no_remote_section() {
        let view = live_config().resolve(Environment::Dev).unwrap();
        let json = render_view(&view, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("remote").is_none());
        assert_eq!(value["local"]["theme_folder"], "mytheme");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        init(&path, false, false).unwrap();
        assert!(path.exists());

        let err = init(&path, true, false).unwrap_err();
        assert!(err.to_string().contains("File already exists"));

        init(&path, true, true).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("staging_path:"));
    }

    #[test]
    fn test_check_template_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        init(&path, false, false).unwrap();

        assert!(!check(&path, None).unwrap());
        assert!(check(&path, Some("production")).is_err());
    }

    #[test]
    fn test_check_complete_declaration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, serde_yaml::to_string(&live_config()).unwrap()).unwrap();

        assert!(check(&path, Some("live")).unwrap());
        assert!(!check(&path, Some("staging")).unwrap());
    }
}
