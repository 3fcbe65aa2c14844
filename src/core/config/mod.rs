//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! twit has two configuration scopes:
//! - **Global**: User-level settings
//! - **Repo**: Repository-level overrides
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! The backend must be known before a repository can be opened, so the global
//! scope is loaded first and the repo scope is layered on afterward with
//! [`Config::with_repo`].
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$TWIT_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/twit/config.toml`
//! 3. `~/.twit/config.toml`
//!
//! # Repo Config Location
//!
//! `<git-dir>/twit/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use twit::core::config::Config;
//!
//! let result = Config::load().unwrap();
//! let config = result.config.with_repo(Path::new(".git")).unwrap();
//!
//! println!("Backend: {}", config.backend_choice());
//! println!("Message: {}", config.snapshot_message());
//! ```

pub mod schema;

pub use schema::{GlobalConfig, RepoConfig, SnapshotDefaults};

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::git::{BackendChoice, DEFAULT_PROGRAM};
use crate::snapshot::DEFAULT_MESSAGE;

/// Environment variable naming an explicit global config file.
pub const CONFIG_ENV: &str = "TWIT_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Merged configuration from all sources.
///
/// Accessors apply precedence rules automatically. Repo config overrides
/// global config.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if in a repo)
    pub repo: Option<RepoConfig>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load the global configuration from the default locations.
    ///
    /// Repo config is layered on separately with [`Config::with_repo`] once
    /// the repository has been opened.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed.
    /// Missing config files are not an error (defaults are used).
    pub fn load() -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        if let Some(path) = &explicit {
            if !path.exists() {
                warnings.push(ConfigWarning {
                    message: format!("${} points to a missing file, ignoring it", CONFIG_ENV),
                    path: path.clone(),
                });
            }
        }

        let candidates = Self::global_candidates(
            explicit,
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            dirs::home_dir(),
        );
        let config = Self::load_global_from(&candidates)?;

        Ok(ConfigLoadResult { config, warnings })
    }

    /// Global config locations, most specific first.
    fn global_candidates(
        explicit: Option<PathBuf>,
        xdg_config_home: Option<PathBuf>,
        home: Option<PathBuf>,
    ) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        candidates.extend(explicit);
        candidates.extend(xdg_config_home.map(|xdg| xdg.join("twit/config.toml")));
        candidates.extend(home.map(|home| home.join(".twit/config.toml")));
        candidates
    }

    /// Load the first existing global config among `candidates`.
    fn load_global_from(candidates: &[PathBuf]) -> Result<Self, ConfigError> {
        for path in candidates {
            if path.exists() {
                let global: GlobalConfig = Self::read_config(path)?;
                global.validate()?;
                return Ok(Config {
                    global,
                    global_path: Some(path.clone()),
                    ..Default::default()
                });
            }
        }

        // No config found, use defaults
        Ok(Config::default())
    }

    /// Layer the repo config of the repository at `git_dir` on top.
    ///
    /// A missing repo config file leaves the configuration unchanged.
    pub fn with_repo(mut self, git_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::repo_config_path(git_dir);
        if path.exists() {
            let repo: RepoConfig = Self::read_config(&path)?;
            repo.validate()?;
            self.repo = Some(repo);
            self.repo_path = Some(path);
        }
        Ok(self)
    }

    /// Read and parse a config file.
    fn read_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the path for repo config inside `git_dir`.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("twit/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Get the configured backend choice.
    ///
    /// Defaults to [`BackendChoice::Auto`]. Values are validated at load
    /// time, so an unparsable value can only come from a hand-built config.
    pub fn backend_choice(&self) -> BackendChoice {
        self.global
            .backend
            .as_deref()
            .and_then(BackendChoice::parse)
            .unwrap_or_default()
    }

    /// Get the git executable for the exe backend.
    ///
    /// Defaults to "git".
    pub fn git_program(&self) -> &str {
        self.global.git_program.as_deref().unwrap_or(DEFAULT_PROGRAM)
    }

    /// Get the snapshot commit message.
    ///
    /// Repo config overrides global config; defaults to
    /// [`DEFAULT_MESSAGE`].
    pub fn snapshot_message(&self) -> &str {
        let repo = self
            .repo
            .as_ref()
            .and_then(|r| r.snapshot.as_ref())
            .and_then(|s| s.message.as_deref());
        let global = self
            .global
            .snapshot
            .as_ref()
            .and_then(|s| s.message.as_deref());
        repo.or(global).unwrap_or(DEFAULT_MESSAGE)
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Backend;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_files() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_global_from(&[temp.path().join("missing.toml")]).unwrap();

        assert_eq!(config.backend_choice(), BackendChoice::Auto);
        assert_eq!(config.git_program(), "git");
        assert_eq!(config.snapshot_message(), DEFAULT_MESSAGE);
        assert!(config.global_config_loaded_from().is_none());
    }

    #[test]
    fn candidate_order() {
        let candidates = Config::global_candidates(
            Some(PathBuf::from("/explicit.toml")),
            Some(PathBuf::from("/xdg")),
            Some(PathBuf::from("/home/u")),
        );
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/explicit.toml"),
                PathBuf::from("/xdg/twit/config.toml"),
                PathBuf::from("/home/u/.twit/config.toml"),
            ]
        );

        let candidates = Config::global_candidates(None, None, Some(PathBuf::from("/h")));
        assert_eq!(candidates, vec![PathBuf::from("/h/.twit/config.toml")]);
    }

    #[test]
    fn first_existing_global_wins() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first.toml");
        let second = temp.path().join("second.toml");
        fs::write(&second, "backend = \"libgit2\"").unwrap();
        fs::write(&first, "backend = \"exe\"\ngit_program = \"/usr/bin/git\"").unwrap();

        let config = Config::load_global_from(&[first.clone(), second]).unwrap();

        assert_eq!(config.backend_choice(), BackendChoice::Exact(Backend::Exe));
        assert_eq!(config.git_program(), "/usr/bin/git");
        assert_eq!(config.global_config_loaded_from(), Some(first.as_path()));
    }

    #[test]
    fn invalid_global_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "backend = \"svn\"").unwrap();

        let err = Config::load_global_from(&[path]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "backend = ").unwrap();

        let err = Config::load_global_from(&[path]).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn load_repo_config() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join("twit");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("config.toml"),
            r#"
            [snapshot]
            message = "checkpoint"
            "#,
        )
        .unwrap();

        let config = Config::default().with_repo(temp.path()).unwrap();

        assert_eq!(config.snapshot_message(), "checkpoint");
        assert_eq!(
            config.repo_config_loaded_from(),
            Some(temp.path().join("twit/config.toml").as_path())
        );
    }

    #[test]
    fn missing_repo_config_is_fine() {
        let temp = TempDir::new().unwrap();
        let config = Config::default().with_repo(temp.path()).unwrap();
        assert!(config.repo.is_none());
    }

    #[test]
    fn repo_layer_goes_over_loaded_global() {
        let temp = TempDir::new().unwrap();
        let global_path = temp.path().join("global.toml");
        fs::write(&global_path, "[snapshot]\nmessage = \"global\"").unwrap();
        let git_dir = temp.path().join("repo.git");
        fs::create_dir_all(git_dir.join("twit")).unwrap();
        fs::write(
            Config::repo_config_path(&git_dir),
            "[snapshot]\nmessage = \"repo\"",
        )
        .unwrap();

        let global = Config::load_global_from(&[global_path.clone()]).unwrap();
        assert_eq!(global.snapshot_message(), "global");
        assert!(global.repo_config_loaded_from().is_none());

        let layered = global.with_repo(&git_dir).unwrap();
        assert_eq!(layered.snapshot_message(), "repo");
        assert_eq!(layered.global_config_loaded_from(), Some(global_path.as_path()));
        assert_eq!(
            layered.repo_config_loaded_from(),
            Some(git_dir.join("twit/config.toml").as_path())
        );
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join("twit");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("config.toml"), "unknown_field = true").unwrap();

        assert!(Config::default().with_repo(temp.path()).is_err());
    }

    #[test]
    fn precedence_repo_overrides_global() {
        let global_only = Config {
            global: GlobalConfig {
                snapshot: Some(SnapshotDefaults {
                    message: Some("global".to_string()),
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(global_only.snapshot_message(), "global");

        let both = Config {
            repo: Some(RepoConfig {
                snapshot: Some(SnapshotDefaults {
                    message: Some("repo".to_string()),
                }),
            }),
            ..global_only
        };
        assert_eq!(both.snapshot_message(), "repo");
    }
}
