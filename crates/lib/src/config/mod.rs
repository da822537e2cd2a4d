//! Environment registry for devdrop.
//!
//! Owns the login identity, the named environments and the "current
//! environment" pointer, all persisted in a single YAML file.
//!
//! # File Format
//!
//! ```yaml
//! username: alice
//! base_image: ubuntu:24.04
//! auth_token: eyJ1c2VybmFtZSI6...
//! current_environment: devdrop-go
//! environments:
//!   devdrop-go:
//!     image: alice/devdrop-go:latest
//!     base_image: golang:latest
//!     created: 2025-01-04T10:12:00Z
//!     last_updated: 2025-01-05T08:30:00Z
//!     description: Environment based on golang:latest
//! ```
//!
//! Every mutation is a full load-mutate-save cycle; there is no long-lived
//! in-process state shared between commands.

mod name;
mod store;
mod types;

pub use name::{normalize_name, personal_image_reference};
pub use types::{Config, ConfigError, Environment};
