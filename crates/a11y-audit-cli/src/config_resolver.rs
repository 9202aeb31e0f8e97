//! Locating and loading `a11y-audit.toml`.
//!
//! Lookup order, first hit wins:
//!
//! 1. `--config <file>`
//! 2. `a11y-audit.toml` or `.a11y-audit.toml` in the audited directory or
//!    any of its ancestors (the nearest one)
//! 3. `config.toml` in the global directory (`$A11Y_AUDIT_CONFIG_DIR`, else
//!    `~/.a11y-audit/`)
//! 4. built-in defaults

use a11y_audit::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found next to the audited pages.
    Project(PathBuf),
    /// Found in the global directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    /// Path of the config file, if one was found.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// A parsed config together with its raw text, which `[[custom-rule]]`
/// loading reads separately.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub content: String,
    pub source: ConfigSource,
}

const PROJECT_CONFIG_NAMES: &[&str] = &["a11y-audit.toml", ".a11y-audit.toml"];
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Finds the config that applies to `target` (a file or directory).
#[must_use]
pub fn resolve(target: &Path, explicit: Option<&Path>) -> ConfigSource {
    resolve_with_global(target, explicit, global_config_dir())
}

fn resolve_with_global(
    target: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(p) = explicit {
        return ConfigSource::Explicit(p.to_path_buf());
    }

    let start = if target.is_file() {
        target.parent().unwrap_or(target)
    } else {
        target
    };
    for dir in start.ancestors() {
        if let Some(found) = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
        {
            tracing::debug!(path = %found.display(), "project config");
            return ConfigSource::Project(found);
        }
    }

    global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|candidate| candidate.is_file())
        .map_or(ConfigSource::Default, |found| {
            tracing::debug!(path = %found.display(), "global config");
            ConfigSource::Global(found)
        })
}

/// `$A11Y_AUDIT_CONFIG_DIR`, else `~/.a11y-audit/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os("A11Y_AUDIT_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".a11y-audit")))
}

/// Reads and parses the config for `source`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid config.
pub fn load(source: ConfigSource) -> Result<LoadedConfig> {
    let Some(path) = source.path() else {
        return Ok(LoadedConfig {
            config: Config::default(),
            content: String::new(),
            source,
        });
    };
    if matches!(source, ConfigSource::Global(_)) {
        tracing::info!("Using global config: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = Config::parse(&content)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    Ok(LoadedConfig {
        config,
        content,
        source,
    })
}
