//! Deployment environment tags

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deployment target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development checkout
    Dev,
    /// Remote staging site, only present in three-environment declarations
    Staging,
    /// Remote production site
    Live,
}

impl Environment {
    /// All environments in declaration order
    pub const ALL: [Environment; 3] = [Environment::Dev, Environment::Staging, Environment::Live];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Staging => "staging",
            Environment::Live => "live",
        }
    }

    /// Whether this target lives on the remote server
    pub fn is_remote(&self) -> bool {
        !matches!(self, Environment::Dev)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Environment::Dev),
            "staging" => Ok(Environment::Staging),
            "live" => Ok(Environment::Live),
            other => Err(ConfigError::UnknownEnvironment {
                name: other.to_string(),
            }),
        }
    }
}
