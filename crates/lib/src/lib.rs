//! devdrop-lib: environment registry and collaborators for devdrop
//!
//! - `config`: the persisted registry of named environments
//! - `engine`: container engine interface and its Docker implementation
//! - `hub`: container registry HTTP API
//! - `backend`: lazy construction of the collaborators for command handlers

pub mod auth;
pub mod backend;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod hub;
pub mod paths;
