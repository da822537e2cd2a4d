//! Status command implementation.
//!
//! Shows the login identity, the current environment and its metadata.

use anyhow::Result;
use chrono::Utc;
use serde_json::json;

use devdrop_lib::config::Config;

use crate::output::{
  OutputFormat, format_age, format_timestamp, print_header, print_info, print_json, print_stat, print_success, symbols,
};

pub fn cmd_status(config: &Config, format: OutputFormat) -> Result<()> {
  if !config.is_logged_in() {
    if format.is_json() {
      return print_json(&json!({ "logged_in": false }));
    }
    print_info("Not logged in. Run 'devdrop login' to authenticate with the registry.");
    return Ok(());
  }

  let current = config.resolve_current_environment();
  let others: Vec<&String> = config.environments.keys().filter(|n| **n != current).collect();

  if format.is_json() {
    let environment = config.environment(&current).map(|env| {
      json!({
        "name": current,
        "image": env.image,
        "expected_image": config.personal_image_reference(&current),
        "base_image": env.base_image,
        "created": env.created,
        "last_updated": env.last_updated,
        "description": env.description,
        "last_container": env.last_container,
      })
    });
    return print_json(&json!({
      "logged_in": true,
      "username": config.username,
      "current_environment": environment,
      "other_environments": others,
    }));
  }

  print_success(&format!("Logged in as {}", config.username));

  let Some(env) = config.environment(&current) else {
    print_info("No environments yet. Run 'devdrop init' to create one.");
    return Ok(());
  };

  println!();
  print_header(&format!("Current environment: {current}"));
  let image = if env.is_committed() {
    env.image.clone()
  } else {
    "(not committed)".to_string()
  };
  print_stat("Image", &image);
  print_stat("Expected image", &config.personal_image_reference(&current));
  print_stat("Base image", &env.base_image);
  print_stat("Created", &format_timestamp(env.created));
  let updated = match env.last_updated {
    Some(at) => format!("{} ({})", format_timestamp(Some(at)), format_age(at, Utc::now())),
    None => format_timestamp(None),
  };
  print_stat("Last updated", &updated);
  if !env.description.is_empty() {
    print_stat("Description", &env.description);
  }
  if env.has_pending_container() {
    print_stat("Pending container", &env.last_container);
    print_info(&format!("Run 'devdrop commit {current}' to save it."));
  }

  if !others.is_empty() {
    println!();
    print_header("Other environments:");
    for name in others {
      println!("  {} {}", symbols::INFO, name);
    }
    print_info("Run 'devdrop switch <name>' to change the current environment.");
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cmd::testutil::temp_config;
  use devdrop_lib::config::Environment;

  #[test]
  fn not_logged_in_is_not_an_error() {
    let (_temp, config) = temp_config(false);
    assert!(cmd_status(&config, OutputFormat::Text).is_ok());
    assert!(cmd_status(&config, OutputFormat::Json).is_ok());
  }

  #[test]
  fn no_environments_is_not_an_error() {
    let (_temp, config) = temp_config(true);
    assert!(cmd_status(&config, OutputFormat::Text).is_ok());
  }

  #[test]
  fn status_does_not_write_config() {
    let (_temp, mut config) = temp_config(true);
    config.environments.insert(
      "devdrop-go".to_string(),
      Environment {
        last_container: "abc".to_string(),
        ..Environment::new("golang:latest")
      },
    );
    config.current_environment = "devdrop-stale".to_string();

    cmd_status(&config, OutputFormat::Text).unwrap();
    cmd_status(&config, OutputFormat::Json).unwrap();

    assert!(!config.path().exists());
  }
}
