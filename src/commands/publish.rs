//! `registry-release publish`

use crate::core::config::{OptionOverrides, ReleaseConfig, ReleaseOptions};
use crate::core::context::ExecutionContext;
use crate::core::error::ReleaseResult;
use crate::core::shell::SystemShell;
use crate::core::vcs::Git;
use crate::registry::cargo::CargoBackend;
use crate::registry::client::{CratesIoClient, HttpTransport, NpmRegistryClient};
use crate::registry::npm::NpmBackend;
use crate::registry::{RegistryBackend, RegistryKind};
use crate::release::{Orchestrator, ReleaseOutcome, ThreadSleeper};

/// Publish the project's package at the configured release version
pub fn run_publish(
  ctx: &ExecutionContext,
  registry: Option<RegistryKind>,
  overrides: OptionOverrides,
) -> ReleaseResult<()> {
  let config = ReleaseConfig::load(&ctx.project_root)?;
  let kind = match registry.or(config.registry) {
    Some(kind) => kind,
    None => RegistryKind::detect(&ctx.project_root)?,
  };
  let options = ReleaseOptions::resolve(&config, &overrides, kind)?;

  let shell = SystemShell;
  let git = Git::open(&shell, &ctx.workspace_root)?;
  let transport = HttpTransport::new()?;

  let backend: Box<dyn RegistryBackend + '_> = match kind {
    RegistryKind::Cargo => Box::new(CargoBackend::new(
      &shell,
      CratesIoClient::new(transport, options.registry_url.as_str()),
    )),
    RegistryKind::Npm => Box::new(NpmBackend::new(
      &shell,
      NpmRegistryClient::new(transport, options.registry_url.as_str()),
    )),
  };

  let env = |name: &str| std::env::var(name).ok();
  let outcome = Orchestrator::new(backend.as_ref(), &git, ctx, &options, &ThreadSleeper).run(&env)?;

  match outcome {
    ReleaseOutcome::AlreadyPublished => {
      println!("⚠️  {} is already published, nothing to do", options.release_version)
    }
    ReleaseOutcome::Published => println!("✅ Published {} ({})", options.release_version, kind),
  }
  Ok(())
}
