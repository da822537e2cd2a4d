//! Push credentials stored in the config as `auth_token`.
//!
//! The token is the base64 encoding of the JSON credential record the engine
//! expects for registry operations:
//!
//! ```json
//! {"username": "alice", "password": "...", "serveraddress": "https://index.docker.io/v1/"}
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bollard::auth::DockerCredentials;
use thiserror::Error;

use crate::consts::DEFAULT_REGISTRY_SERVER;

#[derive(Debug, Error)]
pub enum AuthTokenError {
  #[error("auth token is not valid base64: {0}")]
  Base64(#[from] base64::DecodeError),

  #[error("auth token does not contain registry credentials: {0}")]
  Json(#[from] serde_json::Error),
}

/// Encode registry credentials into the opaque token kept in the config.
pub fn encode_auth_token(username: &str, password: &str) -> Result<String, AuthTokenError> {
  let credentials = DockerCredentials {
    username: Some(username.to_string()),
    password: Some(password.to_string()),
    serveraddress: Some(DEFAULT_REGISTRY_SERVER.to_string()),
    ..Default::default()
  };
  let json = serde_json::to_vec(&credentials)?;
  Ok(STANDARD.encode(json))
}

/// Decode a token produced by [`encode_auth_token`].
pub fn decode_auth_token(token: &str) -> Result<DockerCredentials, AuthTokenError> {
  let json = STANDARD.decode(token.trim())?;
  Ok(serde_json::from_slice(&json)?)
}
