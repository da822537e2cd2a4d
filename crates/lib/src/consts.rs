//! Names and defaults shared across devdrop.

/// Application name, sent as the registry client's user agent.
pub const APP_NAME: &str = "devdrop";

/// Prefix carried by every environment name.
pub const ENV_PREFIX: &str = "devdrop-";

/// Name used when an environment name is left empty.
pub const DEFAULT_ENV_NAME: &str = "devdrop-default";

/// Starter image used when the config does not name one.
pub const DEFAULT_BASE_IMAGE: &str = "ubuntu:24.04";

/// Tag given to every personal environment image.
pub const IMAGE_TAG: &str = "latest";

/// Directory under the home directory holding the config file.
pub const CONFIG_DIR_NAME: &str = ".devdrop";

/// Config file name.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Mount point of the host working directory inside a `run` container.
pub const WORKSPACE_MOUNT: &str = "/workspace";

/// Shell started in every environment container.
pub const CONTAINER_SHELL: &str = "/bin/bash";

/// Registry HTTP API used for login and repository listing.
pub const DEFAULT_HUB_URL: &str = "https://hub.docker.com";

/// Server address recorded in push credentials.
pub const DEFAULT_REGISTRY_SERVER: &str = "https://index.docker.io/v1/";

/// Overrides the directory holding `config.yaml`.
pub const HOME_ENV_VAR: &str = "DEVDROP_HOME";

/// Overrides the registry HTTP API base URL.
pub const HUB_URL_ENV_VAR: &str = "DEVDROP_HUB_URL";

/// Starter image presets offered by `devdrop init`, in menu order.
pub const STARTER_IMAGES: &[(&str, &str)] = &[
  ("ubuntu", "ubuntu:24.04"),
  ("go", "golang:latest"),
  ("node", "node:latest"),
  ("python", "python:latest"),
];
