//! Deployment declaration schema

use serde::{Deserialize, Deserializer, Serialize};
use types::PathKind;

/// Root of the deployment declaration
///
/// Built once by [`crate::ConfigLoader`] and never mutated afterwards;
/// environment-specific values are read through [`DeploymentConfig::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// SSH connection settings
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Site URLs per environment
    #[serde(default)]
    pub domain: DomainConfig,
    /// Database dumps and credentials
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Theme directory mapping
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Plugin directory mapping
    #[serde(default)]
    pub plugins: PluginsConfig,
    /// Upload directory mapping
    #[serde(default)]
    pub uploads: UploadsConfig,
    /// Exclude flags handed verbatim to the transfer tool
    #[serde(default = "default_excludes")]
    pub excludes: String,
}

/// Remote connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// SSH alias or address
    #[serde(default, deserialize_with = "lenient_string")]
    pub host: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user: String,
    /// WordPress root of the live site, e.g. `~/public_html`
    #[serde(default, alias = "wp_path")]
    pub live_path: String,
    /// WordPress root of the staging site; its presence enables staging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging_path: Option<String>,
}

/// Domain names, used for display and search/replace only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    #[serde(default)]
    pub dev: String,
    #[serde(default)]
    pub live: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging: Option<String>,
}

/// Database settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local folder holding dumps
    #[serde(default = "default_database_dev_path")]
    pub dev_path: String,
    #[serde(default = "default_dev_dump")]
    pub dev_dump: String,
    /// Backup folder on the remote server
    #[serde(default = "default_database_remote_path")]
    pub remote_path: String,
    #[serde(default = "default_live_dump")]
    pub live_dump: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub live_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub live_user: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub live_password: String,
    #[serde(default = "default_database_host")]
    pub live_host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging_dump: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub staging_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub staging_user: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub staging_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging_host: Option<String>,
}

/// Theme settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "default_theme_dev_path")]
    pub dev_path: String,
    /// Theme folder name in the local checkout
    #[serde(default)]
    pub dev_folder: String,
    /// Themes directory relative to the remote WordPress root
    #[serde(default = "default_theme_remote_path")]
    pub remote_path: String,
    #[serde(default)]
    pub remote_folder: String,
}

/// Plugin settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginsConfig {
    #[serde(default = "default_plugins_dev_path")]
    pub dev_path: String,
    #[serde(default = "default_plugins_dev_mu_path")]
    pub dev_mu_path: String,
    #[serde(default = "default_plugins_remote_path")]
    pub remote_path: String,
    #[serde(default = "default_plugins_remote_mu_path")]
    pub remote_mu_path: String,
}

/// Upload settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadsConfig {
    #[serde(default = "default_uploads_dev_path")]
    pub dev_path: String,
    #[serde(default = "default_uploads_remote_path")]
    pub remote_path: String,
}

/// A path-like field together with the convention it must follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathField<'a> {
    pub name: &'static str,
    pub value: &'a str,
    pub kind: PathKind,
}

/// Scalar accepted where a string is expected.
///
/// YAML and environment variables turn `12345` or `true` into numbers and
/// booleans, which is never what a password or user name means.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Null => String::new(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Str(s) => s,
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Scalar::deserialize(deserializer)?.into_string())
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_string))
}

fn field<'a>(name: &'static str, value: &'a str, kind: PathKind) -> PathField<'a> {
    PathField { name, value, kind }
}

// Default value functions
fn default_excludes() -> String {
    "--exclude='.git/' --exclude='.gitignore' --exclude='.sass-cache/' --exclude='*.DS_Store'"
        .to_string()
}

pub(crate) fn default_database_host() -> String {
    "127.0.0.1".to_string()
}

fn default_database_dev_path() -> String {
    "./data".to_string()
}

fn default_dev_dump() -> String {
    "dev_dump.sql".to_string()
}

fn default_database_remote_path() -> String {
    "~/backup".to_string()
}

fn default_live_dump() -> String {
    "live_dump.sql".to_string()
}

pub(crate) fn default_staging_dump() -> String {
    "staging_dump.sql".to_string()
}

fn default_theme_dev_path() -> String {
    "./wp-content/themes".to_string()
}

fn default_theme_remote_path() -> String {
    "/wp-content/themes".to_string()
}

fn default_plugins_dev_path() -> String {
    "./wp-content/plugins".to_string()
}

fn default_plugins_dev_mu_path() -> String {
    "./wp-content/mu-plugins".to_string()
}

fn default_plugins_remote_path() -> String {
    "/wp-content/plugins".to_string()
}

fn default_plugins_remote_mu_path() -> String {
    "/wp-content/mu-plugins".to_string()
}

fn default_uploads_dev_path() -> String {
    "./wp-content/uploads".to_string()
}

fn default_uploads_remote_path() -> String {
    "/wp-content/uploads".to_string()
}

impl DeploymentConfig {
    /// Blank three-environment declaration, staging keys present but empty
    pub fn with_staging() -> Self {
        let mut config = Self::default();
        config.remote.staging_path = Some(String::new());
        config.domain.staging = Some(String::new());
        config.database.staging_dump = Some(default_staging_dump());
        config.database.staging_name = Some(String::new());
        config.database.staging_user = Some(String::new());
        config.database.staging_password = Some(String::new());
        config.database.staging_host = Some(default_database_host());
        config
    }

    /// Whether the declaration describes a staging site
    pub fn has_staging(&self) -> bool {
        self.remote.staging_path.is_some()
    }

    /// Whether any staging database key was declared
    pub fn has_staging_database_keys(&self) -> bool {
        let db = &self.database;
        [
            &db.staging_dump,
            &db.staging_name,
            &db.staging_user,
            &db.staging_password,
            &db.staging_host,
        ]
        .iter()
        .any(|value| value.is_some())
    }

    /// Every path-like field of the declaration, including staging ones when declared
    pub fn path_fields(&self) -> Vec<PathField<'_>> {
        let mut fields = vec![
            field("remote.live_path", &self.remote.live_path, PathKind::Remote),
            field("database.dev_path", &self.database.dev_path, PathKind::Local),
            field("database.dev_dump", &self.database.dev_dump, PathKind::FileName),
            field("database.remote_path", &self.database.remote_path, PathKind::Remote),
            field("database.live_dump", &self.database.live_dump, PathKind::FileName),
            field("theme.dev_path", &self.theme.dev_path, PathKind::Local),
            field("theme.dev_folder", &self.theme.dev_folder, PathKind::FileName),
            field("theme.remote_path", &self.theme.remote_path, PathKind::Remote),
            field("theme.remote_folder", &self.theme.remote_folder, PathKind::FileName),
            field("plugins.dev_path", &self.plugins.dev_path, PathKind::Local),
            field("plugins.dev_mu_path", &self.plugins.dev_mu_path, PathKind::Local),
            field("plugins.remote_path", &self.plugins.remote_path, PathKind::Remote),
            field("plugins.remote_mu_path", &self.plugins.remote_mu_path, PathKind::Remote),
            field("uploads.dev_path", &self.uploads.dev_path, PathKind::Local),
            field("uploads.remote_path", &self.uploads.remote_path, PathKind::Remote),
        ];

        if let Some(ref staging_path) = self.remote.staging_path {
            fields.push(field("remote.staging_path", staging_path, PathKind::Remote));
        }
        if let Some(ref staging_dump) = self.database.staging_dump {
            fields.push(field("database.staging_dump", staging_dump, PathKind::FileName));
        }

        fields
    }
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            remote: RemoteConfig::default(),
            domain: DomainConfig::default(),
            database: DatabaseConfig::default(),
            theme: ThemeConfig::default(),
            plugins: PluginsConfig::default(),
            uploads: UploadsConfig::default(),
            excludes: default_excludes(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dev_path: default_database_dev_path(),
            dev_dump: default_dev_dump(),
            remote_path: default_database_remote_path(),
            live_dump: default_live_dump(),
            live_name: String::new(),
            live_user: String::new(),
            live_password: String::new(),
            live_host: default_database_host(),
            staging_dump: None,
            staging_name: None,
            staging_user: None,
            staging_password: None,
            staging_host: None,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            dev_path: default_theme_dev_path(),
            dev_folder: String::new(),
            remote_path: default_theme_remote_path(),
            remote_folder: String::new(),
        }
    }
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            dev_path: default_plugins_dev_path(),
            dev_mu_path: default_plugins_dev_mu_path(),
            remote_path: default_plugins_remote_path(),
            remote_mu_path: default_plugins_remote_mu_path(),
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dev_path: default_uploads_dev_path(),
            remote_path: default_uploads_remote_path(),
        }
    }
}
