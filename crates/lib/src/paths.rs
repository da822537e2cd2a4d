use crate::consts::{CONFIG_DIR_NAME, CONFIG_FILENAME, DEFAULT_HUB_URL, HOME_ENV_VAR, HUB_URL_ENV_VAR};
use std::path::PathBuf;

/// Returns the user's home directory
pub fn home_dir() -> Option<PathBuf> {
  dirs::home_dir()
}

/// Returns the directory holding the devdrop config file.
///
/// `DEVDROP_HOME` takes precedence over `~/.devdrop`.
pub fn config_dir() -> Option<PathBuf> {
  if let Ok(path) = std::env::var(HOME_ENV_VAR) {
    if !path.is_empty() {
      return Some(PathBuf::from(path));
    }
  }

  home_dir().map(|home| home.join(CONFIG_DIR_NAME))
}

/// Returns the full path of `config.yaml`.
pub fn config_path() -> Option<PathBuf> {
  config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Returns the registry HTTP API base URL, without a trailing slash.
pub fn hub_url() -> String {
  let url = std::env::var(HUB_URL_ENV_VAR)
    .ok()
    .filter(|v| !v.is_empty())
    .unwrap_or_else(|| DEFAULT_HUB_URL.to_string());
  url.trim_end_matches('/').to_string()
}
