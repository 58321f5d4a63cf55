use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;
mod prompts;

use cmd::{InstallArgs, ManifestArgs};

/// kb-create - KB Labs platform installer
#[derive(Parser)]
#[command(name = "kb-create")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Platform installation directory
  #[arg(long, global = true, value_name = "DIR")]
  platform: Option<String>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Install the platform and record its snapshot
  Install(InstallArgs),

  /// Show what an update would change
  Diff {
    #[command(flatten)]
    manifest: ManifestArgs,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Update an installed platform
  Update {
    #[command(flatten)]
    manifest: ManifestArgs,

    /// Apply without asking
    #[arg(short, long)]
    yes: bool,
  },

  /// Show installation status
  Status {
    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Also list the packages present in the platform directory
    #[arg(long)]
    installed: bool,
  },

  /// Show the latest install log
  Logs {
    /// Follow log output (like tail -f)
    #[arg(short, long)]
    follow: bool,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let platform = cli.platform.as_deref();
  match cli.command {
    Commands::Install(args) => cmd::cmd_install(&args, platform),
    Commands::Diff { manifest, json } => cmd::cmd_diff(&manifest, platform, json),
    Commands::Update { manifest, yes } => cmd::cmd_update(&manifest, platform, yes),
    Commands::Status { json, installed } => cmd::cmd_status(platform, json, installed),
    Commands::Logs { follow } => cmd::cmd_logs(platform, follow),
  }
}
