mod cmd;
mod output;
mod prompts;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use devdrop_lib::backend::DefaultBackend;
use devdrop_lib::config::Config;

use cmd::{
  InitOptions, ListScope, cmd_commit, cmd_init, cmd_login, cmd_ls, cmd_pull, cmd_run, cmd_status, cmd_switch,
};
use output::OutputFormat;
use prompts::TerminalPrompter;

/// devdrop - portable, versioned development environments
#[derive(Parser)]
#[command(name = "devdrop")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Log in to the container registry
  Login,

  /// Create a new environment from a starter image
  Init {
    /// Environment name (prefixed with 'devdrop-')
    #[arg(short, long)]
    name: Option<String>,

    /// Starter image: ubuntu, go, node, python, or custom
    #[arg(short, long)]
    image: Option<String>,

    /// Image to start from with --image custom
    #[arg(long)]
    base_image: Option<String>,

    /// Re-initialize an existing environment without asking
    #[arg(short, long)]
    force: bool,
  },

  /// Start an environment with the current directory mounted at /workspace
  Run {
    /// Environment name (default: current environment)
    name: Option<String>,
  },

  /// Save the last session's changes and push them to the registry
  Commit {
    /// Environment name (default: current environment)
    name: Option<String>,
  },

  /// Pull the latest version of an environment
  Pull {
    /// Environment name (prompts when omitted)
    name: Option<String>,
  },

  /// List local and registry environments
  Ls {
    /// Only list environments on the registry
    #[arg(long, conflicts_with = "local_only")]
    remote_only: bool,

    /// Only list local environments
    #[arg(long)]
    local_only: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Change the current environment
  Switch {
    /// Environment name (prompts when omitted)
    name: Option<String>,
  },

  /// Show the current environment
  Status {
    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("Error: {e:#}");
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  let mut config = Config::load().context("Failed to load config")?;
  let backend = DefaultBackend;
  let prompter = TerminalPrompter;

  match cli.command {
    Commands::Login => cmd_login(&mut config, &backend, &prompter),
    Commands::Init {
      name,
      image,
      base_image,
      force,
    } => {
      let options = InitOptions {
        name,
        image,
        base_image,
        force,
      };
      cmd_init(&mut config, &backend, &prompter, &options)
    }
    Commands::Run { name } => cmd_run(&mut config, &backend, name.as_deref()),
    Commands::Commit { name } => cmd_commit(&mut config, &backend, name.as_deref()),
    Commands::Pull { name } => cmd_pull(&mut config, &backend, &prompter, name.as_deref()),
    Commands::Ls {
      remote_only,
      local_only,
      output,
    } => {
      let scope = match (remote_only, local_only) {
        (true, _) => ListScope::RemoteOnly,
        (_, true) => ListScope::LocalOnly,
        _ => ListScope::All,
      };
      cmd_ls(&config, &backend, scope, output)
    }
    Commands::Switch { name } => cmd_switch(&mut config, &prompter, name.as_deref()),
    Commands::Status { output } => cmd_status(&config, output),
  }
}
