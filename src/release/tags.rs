//! Tag and push step
//!
//! Shares the clean-worktree gate with the publish sequence, then tags HEAD
//! and pushes the branch and tags to origin.

use crate::core::config::PushTagsOptions;
use crate::core::error::ReleaseResult;
use crate::core::vcs::Git;

/// Create the configured tags and push them with the branch
pub fn push_tags(git: &Git<'_>, project_name: &str, options: &PushTagsOptions) -> ReleaseResult<()> {
  if options.tags.is_empty() {
    tracing::warn!("No tags configured for {}, pushing {} only", project_name, options.branch);
  }

  git.ensure_clean_worktree()?;

  tracing::debug!("Tagging in {}", git.work_tree().display());
  let message = format!("auto-generated tag for {}", project_name);
  for tag in &options.tags {
    tracing::info!("Tagging {}", tag);
    git.create_annotated_tag(tag, &message)?;
  }

  if let Some(remote) = &options.push_remote {
    git.set_push_url(remote)?;
  }

  git.push_branch(&options.branch)?;
  if !options.tags.is_empty() {
    git.push_tags()?;
  }

  Ok(())
}
