//! YAML configuration files.
//!
//! A config file has a single `defaults:` section shaped like [`ArtOptions`].
//! Missing keys keep their built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GpxArtError;
use crate::options::ArtOptions;

type Result<T> = std::result::Result<T, GpxArtError>;

pub const CONFIG_ENV_VAR: &str = "GPX_ART_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "gpx-art.yml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub defaults: ArtOptions,
}

/// `~/.gpx-art/config.yml`, if a home directory is known.
pub fn home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".gpx-art").join("config.yml"))
}

/// Pick the config file to use: the env override, then the home file if it
/// exists, then `./gpx-art.yml` if it exists, else the home location (which
/// may not exist yet; it is where `init-config` writes by default).
pub fn default_config_path(
    env_override: Option<PathBuf>,
    home_config: Option<PathBuf>,
    cwd: &Path,
) -> Option<PathBuf> {
    if let Some(path) = env_override {
        return Some(path);
    }
    if let Some(home) = home_config.as_ref().filter(|p| p.exists()) {
        return Some(home.clone());
    }
    let local = cwd.join(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    home_config
}

/// Same as [`default_config_path`] but reading the real environment.
pub fn discover_config_path() -> Option<PathBuf> {
    let env_override = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    default_config_path(env_override, home_config_path(), &cwd)
}

/// Load options from `path`, or defaults if the file does not exist.
pub fn load_config(path: &Path) -> Result<ArtOptions> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no config file found, using defaults");
        return Ok(ArtOptions::default());
    }

    let text = fs::read_to_string(path)?;
    let options = parse_config(&text).map_err(|err| GpxArtError::Config {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(options)
}

/// Parse and validate config text. Empty documents mean defaults.
pub fn parse_config(text: &str) -> Result<ArtOptions> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    match value {
        serde_yaml::Value::Null => {
            tracing::warn!("config file is empty, using defaults");
            Ok(ArtOptions::default())
        }
        serde_yaml::Value::Mapping(_) => {
            let file: ConfigFile = serde_yaml::from_value(value)?;
            file.defaults.validate()?;
            Ok(file.defaults)
        }
        _ => Err(GpxArtError::InvalidOption {
            name: "config",
            reason: "not a valid YAML dictionary".to_string(),
        }),
    }
}

/// YAML for a config file holding every default.
pub fn sample_config() -> Result<String> {
    Ok(serde_yaml::to_string(&ConfigFile::default())?)
}

/// Write the sample config to `path`, creating parent directories. Refuses
/// to replace an existing file unless `force` is set.
pub fn write_sample_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(GpxArtError::Config {
            path: path.to_path_buf(),
            reason: "file already exists (use --force to overwrite)".to_string(),
        });
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, sample_config()?)?;
    tracing::info!(path = %path.display(), "wrote config file");
    Ok(())
}
