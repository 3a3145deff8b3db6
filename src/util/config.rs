//! Configuration file support for appdesc.
//!
//! appdesc supports two configuration file locations:
//! - Global: `~/.appdesc/config.toml` - User-wide defaults
//! - Project: `.appdesc/config.toml` next to the descriptor - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// appdesc configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Values filled into descriptors that omit them
    pub defaults: DescriptorDefaults,

    /// Signing identity resolution
    pub signing: SigningConfig,
}

/// Framework-provided descriptor values.
///
/// UI frameworks usually own the SDK levels and version numbers and hand
/// them to the Android build; these settings play that role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DescriptorDefaults {
    pub min_sdk: Option<i64>,
    pub target_sdk: Option<i64>,
    pub compile_sdk: Option<i64>,
    pub version_code: Option<i64>,
    pub version_name: Option<String>,
}

impl DescriptorDefaults {
    /// Merge another set into this one (other takes precedence).
    pub fn merge(&mut self, other: DescriptorDefaults) {
        if other.min_sdk.is_some() {
            self.min_sdk = other.min_sdk;
        }
        if other.target_sdk.is_some() {
            self.target_sdk = other.target_sdk;
        }
        if other.compile_sdk.is_some() {
            self.compile_sdk = other.compile_sdk;
        }
        if other.version_code.is_some() {
            self.version_code = other.version_code;
        }
        if other.version_name.is_some() {
            self.version_name = other.version_name;
        }
    }

    /// Check if any default is configured.
    pub fn is_empty(&self) -> bool {
        *self == DescriptorDefaults::default()
    }
}

/// Signing identity settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SigningConfig {
    /// Path to a signing store file
    pub store: Option<PathBuf>,

    /// Treat the `debug` identity as always known
    pub implicit_debug: Option<bool>,
}

impl SigningConfig {
    /// Whether the debug identity is implicitly available (default: true).
    pub fn implicit_debug(&self) -> bool {
        self.implicit_debug.unwrap_or(true)
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// A relative signing store path is kept as written; callers resolve
    /// it against the directory of the file it came from.
    pub fn merge(&mut self, other: Config) {
        self.defaults.merge(other.defaults);
        if other.signing.store.is_some() {
            self.signing.store = other.signing.store;
        }
        if other.signing.implicit_debug.is_some() {
            self.signing.implicit_debug = other.signing.implicit_debug;
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory: {}", parent.display())
            })?;
        }

        let contents =
            toml::to_string_pretty(self).with_context(|| "failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write config: {}", path.display()))?;

        Ok(())
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.appdesc/config.toml)
/// 2. Global config (~/.appdesc/config.toml)
/// 3. Defaults
///
/// Relative signing store paths are resolved against the directory that
/// contains the `.appdesc` folder declaring them.
pub fn load_config(global_path: Option<&Path>, project_root: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        let mut global = Config::load_or_default(global_path);
        if let Some(base) = global_path.parent().and_then(Path::parent) {
            absolutize_store(&mut global, base);
        }
        config.merge(global);
    }

    let project_path = project_config_path(project_root);
    let mut project = Config::load_or_default(&project_path);
    absolutize_store(&mut project, project_root);
    config.merge(project);

    config
}

fn absolutize_store(config: &mut Config, base: &Path) {
    if let Some(store) = config.signing.store.take() {
        config.signing.store = Some(if store.is_relative() {
            base.join(store)
        } else {
            store
        });
    }
}

/// Get the global appdesc config directory (~/.appdesc).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".appdesc"))
}

/// Get the global config path (~/.appdesc/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.appdesc/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".appdesc").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(
            r#"
[defaults]
min-sdk = 21
version-name = "1.0.0"

[signing]
store = "keys/signing.toml"
implicit-debug = false
"#,
        )
        .unwrap();

        assert_eq!(config.defaults.min_sdk, Some(21));
        assert_eq!(config.defaults.version_name.as_deref(), Some("1.0.0"));
        assert!(config.defaults.target_sdk.is_none());
        assert_eq!(config.signing.store, Some(PathBuf::from("keys/signing.toml")));
        assert!(!config.signing.implicit_debug());
    }

    #[test]
    fn test_implicit_debug_defaults_on() {
        assert!(Config::default().signing.implicit_debug());
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("home").join(".appdesc").join("config.toml");
        Config {
            defaults: DescriptorDefaults {
                min_sdk: Some(19),
                target_sdk: Some(34),
                ..Default::default()
            },
            ..Default::default()
        }
        .save(&global)
        .unwrap();

        let project = tmp.path().join("project");
        Config {
            defaults: DescriptorDefaults {
                min_sdk: Some(21),
                ..Default::default()
            },
            signing: SigningConfig {
                store: Some(PathBuf::from("signing.toml")),
                implicit_debug: None,
            },
        }
        .save(&project_config_path(&project))
        .unwrap();

        let config = load_config(Some(&global), &project);
        assert_eq!(config.defaults.min_sdk, Some(21));
        assert_eq!(config.defaults.target_sdk, Some(34));
        assert_eq!(config.signing.store, Some(project.join("signing.toml")));
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(Some(&tmp.path().join("nope.toml")), tmp.path());
        assert_eq!(config, Config::default());
        assert!(config.defaults.is_empty());
    }

    #[test]
    fn test_broken_config_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = project_config_path(tmp.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[defaults\n").unwrap();
        assert_eq!(Config::load_or_default(&path), Config::default());
    }
}
