//! Release publish sequence
//!
//! ```text
//! validate → clean-check → already published? ─yes→ done
//!                              │ no
//!                              v
//!            link → bump → commit → publish → await availability
//! ```
//!
//! Every step before publish runs once and any failure aborts the run. Only
//! the final availability check repeats. Re-running after a failure is safe:
//! a published version short-circuits, and when HEAD is already the version
//! bump commit for the release, linking, bump and commit are skipped.

use super::linker;
use crate::core::config::ReleaseOptions;
use crate::core::context::ExecutionContext;
use crate::core::error::{ReleaseResult, ValidationError};
use crate::core::vcs::Git;
use crate::manifest::same_version;
use crate::registry::RegistryBackend;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Suspension between availability checks
pub trait Sleeper {
  fn sleep(&self, duration: Duration);
}

/// Blocks the current thread
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
  fn sleep(&self, duration: Duration) {
    thread::sleep(duration);
  }
}

/// How a successful run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
  /// The release version was already on the registry; nothing was changed
  AlreadyPublished,
  /// Published and visible on the registry
  Published,
}

pub struct Orchestrator<'a> {
  backend: &'a dyn RegistryBackend,
  git: &'a Git<'a>,
  ctx: &'a ExecutionContext,
  options: &'a ReleaseOptions,
  sleeper: &'a dyn Sleeper,
}

impl<'a> Orchestrator<'a> {
  pub fn new(
    backend: &'a dyn RegistryBackend,
    git: &'a Git<'a>,
    ctx: &'a ExecutionContext,
    options: &'a ReleaseOptions,
    sleeper: &'a dyn Sleeper,
  ) -> Self {
    Self {
      backend,
      git,
      ctx,
      options,
      sleeper,
    }
  }

  /// Run the full sequence, reading credentials through `env`
  pub fn run(&self, env: &dyn Fn(&str) -> Option<String>) -> ReleaseResult<ReleaseOutcome> {
    let kind = self.backend.kind();
    let release = &self.options.release_version;

    // Validate
    let credentials = self.backend.credentials(env)?;
    let manifest_path = self.ctx.manifest_path(kind);
    let content = fs::read_to_string(&manifest_path).map_err(|e| ValidationError::Manifest {
      path: manifest_path.clone(),
      problems: vec![format!("could not read {} manifest: {}", kind, e)],
    })?;
    let manifest = self.backend.parse_manifest(&manifest_path, &content)?;

    tracing::info!(
      "Releasing {} {} → {} to {} ({})",
      manifest.name,
      manifest.version,
      release,
      kind,
      self.ctx.project_name
    );

    self.git.ensure_clean_worktree()?;

    if self.backend.version_exists(&manifest.name, release)? {
      tracing::warn!(
        "{}@{} is already published, nothing to release",
        manifest.name,
        release
      );
      return Ok(ReleaseOutcome::AlreadyPublished);
    }

    let steps = linker::plan(
      &manifest,
      &self.backend.categories(),
      |category| kind.section_name(category).unwrap_or(category.as_str()).to_string(),
      &self.options.linked_dependencies,
    )?;
    let message = format!(
      "release: bump package version to {} and linked dependencies versions for {} ({})",
      release, manifest.name, self.ctx.project_name
    );

    if same_version(&manifest.version, release) && self.git.head_subject()? == message {
      tracing::info!("HEAD is already the version bump for {}, skipping to publish", release);
    } else {
      linker::apply(self.backend, &self.ctx.project_root, &steps, release)?;
      self.backend.set_own_version(&self.ctx.project_root, release)?;
      self.git.commit_version_bump(&self.release_paths()?, &message)?;
    }

    self.backend.publish(&self.ctx.project_root, &credentials)?;

    self.await_availability(&manifest.name)?;
    Ok(ReleaseOutcome::Published)
  }

  /// Manifest plus the lockfile, unless git ignores it
  fn release_paths(&self) -> ReleaseResult<Vec<PathBuf>> {
    let kind = self.backend.kind();
    let mut paths = vec![self.ctx.manifest_path(kind)];
    if let Some(lockfile) = self.ctx.lockfile_path(kind) {
      if self.git.is_ignored(&lockfile)? {
        tracing::debug!("{} is ignored by git, not staging it", lockfile.display());
      } else {
        paths.push(lockfile);
      }
    }
    Ok(paths)
  }

  /// Poll until the release version is visible; no attempt cap
  fn await_availability(&self, name: &str) -> ReleaseResult<()> {
    let release = &self.options.release_version;
    let mut attempt = 1u64;

    while !self.backend.version_exists(name, release)? {
      tracing::info!(
        "{}@{} not available yet (attempt {}), checking again in {}s",
        name,
        release,
        attempt,
        self.options.poll_interval.as_secs()
      );
      self.sleeper.sleep(self.options.poll_interval);
      attempt += 1;
    }

    tracing::info!("{}@{} is available", name, release);
    Ok(())
  }
}
