//! Environment resolution
//!
//! Flattens a [`DeploymentConfig`] into the view needed by one deployment
//! target, so consumers never branch on environment tags themselves.

use crate::schema::{default_database_host, default_staging_dump, DeploymentConfig};
use serde::Serialize;
use tracing::debug;
use types::utils::{check_path, join_path, mask_secret, require};
use types::{ConfigError, Environment, Result};

/// Configuration of a single deployment target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEnvironment {
    pub environment: Environment,
    /// Site URL, when one is declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub local: LocalSite,
    /// Remote side of the target; `None` for `dev`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteSite>,
    pub excludes: String,
}

/// Local checkout paths, relative to the project root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalSite {
    /// Dev database folder and dump; only present in the `dev` view
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_dump: Option<String>,
    pub theme_path: String,
    pub theme_folder: String,
    pub plugins_path: String,
    pub mu_plugins_path: String,
    pub uploads_path: String,
}

/// Remote server settings for `staging` or `live`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteSite {
    pub host: String,
    pub user: String,
    /// WordPress root on the server
    pub wp_path: String,
    /// Backup folder for database dumps
    pub backup_path: String,
    pub database: DatabaseCredentials,
    /// Remaining paths are relative to `wp_path`
    pub theme_path: String,
    pub theme_folder: String,
    pub plugins_path: String,
    pub mu_plugins_path: String,
    pub uploads_path: String,
}

/// Database credentials of the targeted remote site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseCredentials {
    pub name: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub dump: String,
}

impl LocalSite {
    pub fn dump_file(&self) -> Option<String> {
        match (&self.database_path, &self.database_dump) {
            (Some(path), Some(dump)) => Some(join_path(path, dump)),
            _ => None,
        }
    }

    pub fn theme_dir(&self) -> String {
        join_path(&self.theme_path, &self.theme_folder)
    }
}

impl RemoteSite {
    /// `user@host` as understood by ssh and rsync
    pub fn ssh_destination(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    pub fn dump_file(&self) -> String {
        join_path(&self.backup_path, &self.database.dump)
    }

    pub fn theme_dir(&self) -> String {
        join_path(&join_path(&self.wp_path, &self.theme_path), &self.theme_folder)
    }

    pub fn plugins_dir(&self) -> String {
        join_path(&self.wp_path, &self.plugins_path)
    }

    pub fn mu_plugins_dir(&self) -> String {
        join_path(&self.wp_path, &self.mu_plugins_path)
    }

    pub fn uploads_dir(&self) -> String {
        join_path(&self.wp_path, &self.uploads_path)
    }
}

impl DatabaseCredentials {
    /// Copy with the password masked, for display
    pub fn redacted(&self) -> Self {
        Self {
            password: mask_secret(&self.password),
            ..self.clone()
        }
    }
}

impl ResolvedEnvironment {
    /// Copy with every secret masked, for display
    pub fn redacted(&self) -> Self {
        let mut view = self.clone();
        if let Some(ref mut remote) = view.remote {
            remote.database = remote.database.redacted();
        }
        view
    }
}

/// Resolve a target given as a string tag (`dev`, `staging` or `live`)
pub fn resolve_environment(config: &DeploymentConfig, target: &str) -> Result<ResolvedEnvironment> {
    let environment: Environment = target.parse()?;
    config.resolve(environment)
}

impl DeploymentConfig {
    /// Fields that must be non-empty for the given target, in reporting order
    pub fn required_fields(&self, environment: Environment) -> Result<Vec<(&'static str, &str)>> {
        let mut fields = vec![
            ("database.dev_path", self.database.dev_path.as_str()),
            ("database.dev_dump", self.database.dev_dump.as_str()),
            ("theme.dev_path", self.theme.dev_path.as_str()),
            ("theme.dev_folder", self.theme.dev_folder.as_str()),
            ("plugins.dev_path", self.plugins.dev_path.as_str()),
            ("plugins.dev_mu_path", self.plugins.dev_mu_path.as_str()),
            ("uploads.dev_path", self.uploads.dev_path.as_str()),
            ("excludes", self.excludes.as_str()),
        ];

        if environment.is_remote() {
            fields.extend([
                ("remote.host", self.remote.host.as_str()),
                ("remote.user", self.remote.user.as_str()),
                ("database.remote_path", self.database.remote_path.as_str()),
                ("theme.remote_path", self.theme.remote_path.as_str()),
                ("theme.remote_folder", self.theme.remote_folder.as_str()),
                ("plugins.remote_path", self.plugins.remote_path.as_str()),
                ("plugins.remote_mu_path", self.plugins.remote_mu_path.as_str()),
                ("uploads.remote_path", self.uploads.remote_path.as_str()),
            ]);
        }

        match environment {
            Environment::Dev => {}
            Environment::Live => fields.extend([
                ("remote.live_path", self.remote.live_path.as_str()),
                ("database.live_dump", self.database.live_dump.as_str()),
                ("database.live_name", self.database.live_name.as_str()),
                ("database.live_user", self.database.live_user.as_str()),
                ("database.live_password", self.database.live_password.as_str()),
            ]),
            Environment::Staging => {
                let staging_path = self
                    .remote
                    .staging_path
                    .as_deref()
                    .ok_or_else(|| ConfigError::EnvironmentNotConfigured {
                        environment: environment.to_string(),
                    })?;
                fields.extend([
                    ("remote.staging_path", staging_path),
                    ("database.staging_name", self.database.staging_name.as_deref().unwrap_or("")),
                    ("database.staging_user", self.database.staging_user.as_deref().unwrap_or("")),
                ]);
            }
        }

        Ok(fields)
    }

    /// Flatten the declaration into the view for `environment`.
    ///
    /// Pure and idempotent: the declaration is only read.
    pub fn resolve(&self, environment: Environment) -> Result<ResolvedEnvironment> {
        for field in self.path_fields() {
            check_path(field.name, field.value, field.kind)?;
        }
        for (field, value) in self.required_fields(environment)? {
            require(field, value)?;
        }

        let dev = environment == Environment::Dev;
        let local = LocalSite {
            database_path: dev.then(|| self.database.dev_path.clone()),
            database_dump: dev.then(|| self.database.dev_dump.clone()),
            theme_path: self.theme.dev_path.clone(),
            theme_folder: self.theme.dev_folder.clone(),
            plugins_path: self.plugins.dev_path.clone(),
            mu_plugins_path: self.plugins.dev_mu_path.clone(),
            uploads_path: self.uploads.dev_path.clone(),
        };

        let (domain, remote) = match environment {
            Environment::Dev => (self.domain.dev.as_str(), None),
            Environment::Live => (
                self.domain.live.as_str(),
                Some(self.remote_site(&self.remote.live_path, self.live_credentials())),
            ),
            Environment::Staging => {
                let staging_path = self.remote.staging_path.as_deref().unwrap_or_default();
                (
                    self.domain.staging.as_deref().unwrap_or_default(),
                    Some(self.remote_site(staging_path, self.staging_credentials())),
                )
            }
        };

        debug!(environment = %environment, "Resolved deployment environment");

        Ok(ResolvedEnvironment {
            environment,
            domain: non_empty(domain),
            local,
            remote,
            excludes: self.excludes.clone(),
        })
    }

    fn remote_site(&self, wp_path: &str, database: DatabaseCredentials) -> RemoteSite {
        RemoteSite {
            host: self.remote.host.clone(),
            user: self.remote.user.clone(),
            wp_path: wp_path.to_string(),
            backup_path: self.database.remote_path.clone(),
            database,
            theme_path: self.theme.remote_path.clone(),
            theme_folder: self.theme.remote_folder.clone(),
            plugins_path: self.plugins.remote_path.clone(),
            mu_plugins_path: self.plugins.remote_mu_path.clone(),
            uploads_path: self.uploads.remote_path.clone(),
        }
    }

    fn live_credentials(&self) -> DatabaseCredentials {
        let db = &self.database;
        DatabaseCredentials {
            name: db.live_name.clone(),
            user: db.live_user.clone(),
            password: db.live_password.clone(),
            host: non_empty(&db.live_host).unwrap_or_else(default_database_host),
            dump: db.live_dump.clone(),
        }
    }

    fn staging_credentials(&self) -> DatabaseCredentials {
        let db = &self.database;
        DatabaseCredentials {
            name: db.staging_name.clone().unwrap_or_default(),
            user: db.staging_user.clone().unwrap_or_default(),
            password: db.staging_password.clone().unwrap_or_default(),
            host: db
                .staging_host
                .as_deref()
                .and_then(non_empty)
                .unwrap_or_else(default_database_host),
            dump: db
                .staging_dump
                .as_deref()
                .and_then(non_empty)
                .unwrap_or_else(default_staging_dump),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
