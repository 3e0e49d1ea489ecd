//! Path convention checks and small helpers

use crate::error::ConfigError;

/// Convention a path field must follow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Relative to the project root, e.g. `./wp-content/themes`
    Local,
    /// Absolute from the remote user's home directory, e.g. `~/public_html`
    Remote,
    /// A bare file or folder name, e.g. `live_dump.sql`
    FileName,
}

impl PathKind {
    pub fn describe(&self) -> &'static str {
        match self {
            PathKind::Local => "local paths must be relative to the project root",
            PathKind::Remote => "remote paths must be absolute (start with '/' or '~')",
            PathKind::FileName => "must be a bare name without '/'",
        }
    }
}

/// Check a non-empty path against the trailing-separator rule and its category.
///
/// Empty values pass: whether a field may be empty depends on the targeted
/// environment and is checked by [`require`].
pub fn check_path(field: &str, value: &str, kind: PathKind) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Ok(());
    }

    if value.ends_with('/') {
        return Err(ConfigError::invalid_path(field, value, "trailing path separator"));
    }

    let absolute = value.starts_with('/') || value.starts_with('~');
    let valid = match kind {
        PathKind::Local => !absolute,
        PathKind::Remote => absolute,
        PathKind::FileName => !value.contains('/'),
    };

    if !valid {
        return Err(ConfigError::invalid_path(field, value, kind.describe()));
    }

    Ok(())
}

/// Return the value, or `MissingField` when it is blank
pub fn require<'a>(field: &str, value: &'a str) -> Result<&'a str, ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::missing(field))
    } else {
        Ok(value)
    }
}

/// Join a base directory and a sub path without doubling separators
pub fn join_path(base: &str, rest: &str) -> String {
    let rest = rest.trim_start_matches("./");
    if rest.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), rest.trim_start_matches('/'))
}

/// Whether a string looks like an http(s) URL
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Mask a secret for display, keeping only whether it is set
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}
