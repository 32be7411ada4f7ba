mod commands;
mod core;
mod manifest;
mod registry;
mod release;
#[cfg(test)]
mod testing;

use clap::{Args, Parser, Subcommand};
use core::config::OptionOverrides;
use core::context::ExecutionContext;
use core::error::{ReleaseError, print_error};
use registry::RegistryKind;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Publish monorepo packages to their registry and push release tags
#[derive(Parser)]
#[command(name = "registry-release")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(flatten)]
  project: ProjectArgs,

  /// Log debug output (overridden by RUST_LOG)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Args)]
struct ProjectArgs {
  /// Workspace (monorepo) root (default: current directory)
  #[arg(long, global = true)]
  workspace_root: Option<PathBuf>,

  /// Project directory, absolute or relative to the current directory (default: current directory)
  #[arg(long, global = true)]
  project_root: Option<PathBuf>,

  /// Project identifier used in commit and tag messages (default: project directory name)
  #[arg(long, global = true)]
  project_name: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
  /// Link dependencies, bump, commit, publish and wait for the registry
  Publish {
    /// Version to release (overrides release.toml)
    #[arg(long)]
    release_version: Option<String>,
    /// Dependency to pin to the release version, as <category>=<name> (repeatable)
    #[arg(long = "link", value_name = "CATEGORY=NAME")]
    links: Vec<String>,
    /// Registry to publish to: cargo or npm (default: detected from the manifest)
    #[arg(long)]
    registry: Option<RegistryKind>,
    /// Registry base URL (overrides release.toml)
    #[arg(long)]
    registry_url: Option<String>,
    /// Seconds between availability checks (default: 60)
    #[arg(long, value_name = "SECS")]
    poll_interval: Option<u64>,
  },

  /// Tag HEAD and push the branch and tags to origin
  PushTags {
    /// Tag to create (repeatable, overrides release.toml)
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,
    /// Push URL to set on origin before pushing
    #[arg(long)]
    push_remote: Option<String>,
    /// Branch to push (default: master)
    #[arg(long)]
    branch: Option<String>,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let current_dir = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => handle_error(ReleaseError::Io(std::io::Error::new(
      e.kind(),
      format!("failed to get current directory: {}", e),
    ))),
  };
  let ctx = build_context(&current_dir, cli.project);

  let result = match cli.command {
    Commands::Publish {
      release_version,
      links,
      registry,
      registry_url,
      poll_interval,
    } => commands::run_publish(
      &ctx,
      registry,
      OptionOverrides {
        release_version,
        links,
        poll_interval_secs: poll_interval,
        registry_url,
      },
    ),
    Commands::PushTags {
      tags,
      push_remote,
      branch,
    } => commands::run_push_tags(&ctx, tags, push_remote, branch),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

/// Resolve workspace and project roots against the current directory
fn build_context(current_dir: &Path, args: ProjectArgs) -> ExecutionContext {
  let absolute = |path: Option<PathBuf>| match path {
    Some(p) if p.is_absolute() => p,
    Some(p) => current_dir.join(p),
    None => current_dir.to_path_buf(),
  };

  ExecutionContext::new(
    &absolute(args.workspace_root),
    &absolute(args.project_root),
    args.project_name,
  )
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
