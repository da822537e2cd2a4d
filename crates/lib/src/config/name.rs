use crate::consts::{DEFAULT_ENV_NAME, ENV_PREFIX, IMAGE_TAG};

/// Normalize an environment name so it carries the `devdrop-` prefix.
///
/// An empty name maps to `devdrop-default`. Already-prefixed names are
/// returned unchanged, so the function is idempotent.
pub fn normalize_name(raw: &str) -> String {
  if raw.is_empty() {
    return DEFAULT_ENV_NAME.to_string();
  }
  if raw.starts_with(ENV_PREFIX) {
    return raw.to_string();
  }
  format!("{ENV_PREFIX}{raw}")
}

/// Build the registry reference `{username}/{name}:latest` for an environment.
///
/// Returns an empty string when `username` is empty, which callers treat as
/// "not logged in".
pub fn personal_image_reference(username: &str, name: &str) -> String {
  if username.is_empty() {
    return String::new();
  }
  format!("{}/{}:{}", username, normalize_name(name), IMAGE_TAG)
}
