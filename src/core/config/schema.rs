//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$TWIT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/twit/config.toml`
//! 3. `~/.twit/config.toml` (canonical write location)
//!
//! # Repo Config
//!
//! Located at `<git-dir>/twit/config.toml`.
//!
//! # Validation
//!
//! Config values are validated after parsing (e.g., `backend` must name a
//! known backend).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::git::BackendChoice;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// backend = "exe"
/// git_program = "/usr/local/bin/git"
///
/// [snapshot]
/// message = "wip"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Backend to use: "auto", "exe" or "libgit2"
    pub backend: Option<String>,

    /// Git executable used by the exe backend
    pub git_program: Option<String>,

    /// Snapshot defaults
    pub snapshot: Option<SnapshotDefaults>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(backend) = &self.backend {
            if BackendChoice::parse(backend).is_none() {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid backend '{}', must be one of: {}",
                    backend,
                    BackendChoice::valid_names().join(", ")
                )));
            }
        }

        if let Some(program) = &self.git_program {
            if program.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "git_program cannot be empty".to_string(),
                ));
            }
        }

        if let Some(snapshot) = &self.snapshot {
            snapshot.validate()?;
        }

        Ok(())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// [snapshot]
/// message = "checkpoint"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Snapshot defaults for this repository
    pub snapshot: Option<SnapshotDefaults>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(snapshot) = &self.snapshot {
            snapshot.validate()?;
        }
        Ok(())
    }
}

/// Snapshot defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotDefaults {
    /// Commit message for snapshots taken without `-m`
    pub message: Option<String>,
}

impl SnapshotDefaults {
    /// Validate the snapshot defaults.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(message) = &self.message {
            if message.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "snapshot message cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod global_config {
        use super::*;

        #[test]
        fn defaults() {
            let config = GlobalConfig::default();
            assert!(config.backend.is_none());
            assert!(config.git_program.is_none());
            assert!(config.snapshot.is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn valid_backends() {
            for name in ["auto", "exe", "libgit2", "Git2"] {
                let config = GlobalConfig {
                    backend: Some(name.to_string()),
                    ..Default::default()
                };
                assert!(config.validate().is_ok(), "{name} should be accepted");
            }
        }

        #[test]
        fn invalid_backend() {
            let config = GlobalConfig {
                backend: Some("jgit".to_string()),
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("auto, exe, libgit2"));
        }

        #[test]
        fn empty_git_program_rejected() {
            let config = GlobalConfig {
                git_program: Some("  ".to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn roundtrip() {
            let config = GlobalConfig {
                backend: Some("exe".to_string()),
                git_program: Some("/opt/git/bin/git".to_string()),
                snapshot: Some(SnapshotDefaults {
                    message: Some("wip".to_string()),
                }),
            };

            let toml = toml::to_string_pretty(&config).unwrap();
            let parsed: GlobalConfig = toml::from_str(&toml).unwrap();
            assert_eq!(config, parsed);
        }
    }

    mod repo_config {
        use super::*;

        #[test]
        fn parses_snapshot_table() {
            let config: RepoConfig = toml::from_str(
                r#"
                [snapshot]
                message = "checkpoint"
                "#,
            )
            .unwrap();
            assert_eq!(
                config.snapshot.unwrap().message.as_deref(),
                Some("checkpoint")
            );
        }

        #[test]
        fn empty_message_rejected() {
            let config = RepoConfig {
                snapshot: Some(SnapshotDefaults {
                    message: Some(String::new()),
                }),
            };
            assert!(config.validate().is_err());
        }

        #[test]
        fn backend_is_global_only() {
            let result: Result<RepoConfig, _> = toml::from_str("backend = \"exe\"");
            assert!(result.is_err());
        }

        #[test]
        fn reject_unknown_snapshot_fields() {
            let toml = r#"
                [snapshot]
                message = "x"
                interval = 5
            "#;

            let result: Result<RepoConfig, _> = toml::from_str(toml);
            assert!(result.is_err());
        }
    }
}
