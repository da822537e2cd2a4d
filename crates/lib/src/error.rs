use thiserror::Error;

/// Failures a user can act on, each pointing at the command that fixes it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
  #[error("not logged in, run 'devdrop login' first")]
  NotLoggedIn,

  #[error("no registry credentials stored, run 'devdrop login' again")]
  MissingAuthToken,

  #[error("no environments found, run 'devdrop init' to create one")]
  NoEnvironments,

  #[error("no current environment, run 'devdrop switch <name>' to select one")]
  NoCurrentEnvironment,

  #[error("environment '{name}' not found, run 'devdrop ls' to see available environments")]
  EnvironmentNotFound { name: String },

  #[error("no container to commit for '{name}', run 'devdrop run {name}' first")]
  NoContainerToCommit { name: String },

  #[error("image {image} for environment '{name}' not found on the registry; run 'devdrop init' to create it")]
  ImageNotFoundOnRegistry { name: String, image: String },

  #[error("unknown starter image '{0}', expected one of: ubuntu, go, node, python, custom")]
  UnknownStarterImage(String),

  #[error("the custom starter image requires --base-image")]
  MissingCustomImage,

  #[error("invalid selection '{0}'")]
  InvalidSelection(String),

  #[error("{0} cannot be empty")]
  EmptyInput(&'static str),
}
