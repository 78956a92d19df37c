use crate::app::models::Schema;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_COMPRESS_TYPE: &str = "gzip";
pub const DEFAULT_COMPRESS_LEVEL: i32 = 4;

/// Per-user overrides for the schema defaults, read from
/// `~/.config/comprexxion/defaults.toml`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UserDefaults {
    pub compress_type: Option<String>,
    pub compress_level: Option<i32>,
}

fn defaults_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home
        .join(".config")
        .join("comprexxion")
        .join("defaults.toml"))
}

/// Loads the user defaults file. A missing file yields empty defaults.
pub fn load_user_defaults() -> Result<UserDefaults> {
    let config_path = defaults_path()?;

    if !config_path.exists() {
        log::debug!("No user defaults at {:?}", config_path);
        return Ok(UserDefaults::default());
    }

    let content = fs::read_to_string(&config_path)
        .context(format!("Failed to read config at {:?}", config_path))?;

    parse_user_defaults(&content)
        .context(format!("Failed to parse {:?}", config_path))
}

pub fn parse_user_defaults(content: &str) -> Result<UserDefaults> {
    let parsed: UserDefaults = toml::from_str(content)?;
    Ok(parsed)
}

/// Builds the schema a configuration file starts from: the project is named
/// after `current_dir` and rooted at it, compression settings come from
/// `defaults` or the built-in values.
pub fn default_schema(current_dir: &Path, defaults: &UserDefaults) -> Schema {
    let project_name = current_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let project_root = current_dir.to_string_lossy().into_owned();

    Schema::new(
        project_name,
        project_root,
        defaults
            .compress_type
            .clone()
            .unwrap_or_else(|| DEFAULT_COMPRESS_TYPE.to_string()),
        defaults.compress_level.unwrap_or(DEFAULT_COMPRESS_LEVEL),
    )
}
