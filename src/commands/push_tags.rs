//! `registry-release push-tags`

use crate::core::config::{PushTagsOptions, ReleaseConfig};
use crate::core::context::ExecutionContext;
use crate::core::error::ReleaseResult;
use crate::core::shell::SystemShell;
use crate::core::vcs::Git;
use crate::release::push_tags;

/// Tag HEAD and push the branch and tags to origin
pub fn run_push_tags(
  ctx: &ExecutionContext,
  tags: Vec<String>,
  push_remote: Option<String>,
  branch: Option<String>,
) -> ReleaseResult<()> {
  let config = ReleaseConfig::load(&ctx.project_root)?;
  let options = PushTagsOptions::resolve(&config.push_tags, &tags, push_remote, branch)?;

  let shell = SystemShell;
  let git = Git::open(&shell, &ctx.workspace_root)?;
  push_tags(&git, &ctx.project_name, &options)?;

  println!("✅ Pushed {} to origin ({} tag(s))", options.branch, options.tags.len());
  Ok(())
}
