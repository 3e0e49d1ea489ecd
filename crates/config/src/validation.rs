//! Configuration validation utilities

use crate::schema::DeploymentConfig;
use types::utils::{check_path, is_http_url, require};
use types::{ConfigError, Environment, Result};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the declaration and every environment it describes
    pub fn validate(config: &DeploymentConfig) -> ValidationReport {
        let mut report = Self::validate_declaration(config);

        Self::validate_required(config, Environment::Live, &mut report);
        if config.has_staging() {
            Self::validate_required(config, Environment::Staging, &mut report);
        }

        report
    }

    /// Validate the declaration and a single target environment
    pub fn validate_environment(config: &DeploymentConfig, environment: Environment) -> ValidationReport {
        let mut report = Self::validate_declaration(config);
        Self::validate_required(config, environment, &mut report);
        report
    }

    /// Checks that hold regardless of the targeted environment.
    ///
    /// Every path must follow its convention and the local checkout
    /// settings must be present.
    pub fn validate_declaration(config: &DeploymentConfig) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_paths(config, &mut report);
        Self::validate_required(config, Environment::Dev, &mut report);
        Self::validate_domains(config, &mut report);
        Self::validate_excludes(config, &mut report);
        Self::validate_topology(config, &mut report);

        report
    }

    fn validate_paths(config: &DeploymentConfig, report: &mut ValidationReport) {
        for field in config.path_fields() {
            if let Err(e) = check_path(field.name, field.value, field.kind) {
                report.add_error(e);
            }
        }
    }

    fn validate_required(config: &DeploymentConfig, environment: Environment, report: &mut ValidationReport) {
        let fields = match config.required_fields(environment) {
            Ok(fields) => fields,
            Err(e) => {
                report.add_error(e);
                return;
            }
        };

        for (field, value) in fields {
            if let Err(e) = require(field, value) {
                report.add_error(e);
            }
        }
    }

    fn validate_domains(config: &DeploymentConfig, report: &mut ValidationReport) {
        let domains = [
            ("domain.dev", Some(config.domain.dev.as_str())),
            ("domain.live", Some(config.domain.live.as_str())),
            ("domain.staging", config.domain.staging.as_deref()),
        ];

        for (field, value) in domains {
            let Some(value) = value.filter(|v| !v.is_empty()) else {
                continue;
            };
            if !is_http_url(value) {
                report.add_warning(field, &format!("Domain '{}' should start with http:// or https://", value));
            }
        }

        if config.domain.live.starts_with("http://") {
            report.add_warning("domain.live", "Live domain should use HTTPS");
        }
    }

    fn validate_excludes(config: &DeploymentConfig, report: &mut ValidationReport) {
        if !config.excludes.is_empty() && !config.excludes.contains("--exclude") {
            report.add_warning(
                "excludes",
                "Excludes contain no --exclude= pattern, they are passed verbatim to the transfer tool",
            );
        }
    }

    fn validate_topology(config: &DeploymentConfig, report: &mut ValidationReport) {
        if !config.has_staging() && config.has_staging_database_keys() {
            report.add_warning(
                "database",
                "Staging database settings are ignored because remote.staging_path is not set",
            );
        }

        if !config.has_staging() && config.domain.staging.is_some() {
            report.add_warning(
                "domain.staging",
                "Staging domain is ignored because remote.staging_path is not set",
            );
        }
    }
}

/// Validation report containing errors and warnings
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record an error, once per offending field
    pub fn add_error(&mut self, error: ConfigError) {
        let duplicate = match error.field() {
            Some(field) => self.errors.iter().any(|e| e.field() == Some(field)),
            None => self.errors.contains(&error),
        };
        if !duplicate {
            self.errors.push(error);
        }
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> String {
        format!("Validation: {} errors, {} warnings", self.errors.len(), self.warnings.len())
    }

    /// First error in reporting order, for fail-fast callers
    pub fn into_result(self) -> Result<()> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
