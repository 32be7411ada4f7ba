//! Integration tests for `registry-release push-tags`

use crate::helpers::{TestWorkspace, git, run_release, run_release_ok, stderr};
use anyhow::Result;
use tempfile::TempDir;

/// Bare repository wired up as `origin`
fn add_origin(ws: &TestWorkspace) -> Result<TempDir> {
  let remote = TempDir::new()?;
  git(remote.path(), &["init", "--bare", "--initial-branch=main"])?;
  git(&ws.path, &["remote", "add", "origin", &remote.path().to_string_lossy()])?;
  Ok(remote)
}

#[test]
fn test_push_tags_to_origin() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("app", "1.1.0", &[])?;
  ws.commit("release: bump app")?;
  let remote = add_origin(&ws)?;

  run_release_ok(
    &ws.path,
    &[
      "push-tags",
      "--project-root",
      "crates/app",
      "--tag",
      "app@1.1.0",
      "--tag",
      "v1.1.0",
      "--tag",
      "app@1.1.0",
      "--branch",
      "main",
    ],
  )?;

  let tags = git(remote.path(), &["tag", "--list"])?;
  let tags = String::from_utf8_lossy(&tags.stdout);
  assert!(tags.contains("app@1.1.0"));
  assert!(tags.contains("v1.1.0"));

  let message = git(&ws.path, &["tag", "-l", "--format=%(contents:subject)", "v1.1.0"])?;
  assert_eq!(String::from_utf8_lossy(&message.stdout).trim(), "auto-generated tag for app");

  let head = git(remote.path(), &["rev-parse", "main"])?;
  let local = git(&ws.path, &["rev-parse", "HEAD"])?;
  assert_eq!(head.stdout, local.stdout);
  Ok(())
}

#[test]
fn test_push_tags_from_config() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("app", "2.0.0", &[])?;
  ws.write_file(
    "crates/app/release.toml",
    "[push_tags]\ntags = [\"v2.0.0\"]\nbranch = \"main\"\n",
  )?;
  ws.commit("release: bump app")?;
  let remote = add_origin(&ws)?;

  run_release_ok(&ws.path, &["push-tags", "--project-root", "crates/app", "--project-name", "app-svc"])?;

  let message = git(&ws.path, &["tag", "-l", "--format=%(contents:subject)", "v2.0.0"])?;
  assert_eq!(
    String::from_utf8_lossy(&message.stdout).trim(),
    "auto-generated tag for app-svc"
  );
  let tags = git(remote.path(), &["tag", "--list"])?;
  assert_eq!(String::from_utf8_lossy(&tags.stdout).trim(), "v2.0.0");
  Ok(())
}

#[test]
fn test_push_tags_requires_clean_worktree() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("app", "1.0.0", &[])?;
  ws.commit("feat: add app")?;
  let _remote = add_origin(&ws)?;
  ws.write_file("crates/app/src/lib.rs", "pub fn wip() {}\n")?;

  let output = run_release(
    &ws.path,
    &["push-tags", "--project-root", "crates/app", "--tag", "v1.0.0", "--branch", "main"],
    &[],
  )?;

  assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr(&output));
  let tags = git(&ws.path, &["tag", "--list"])?;
  assert!(tags.stdout.is_empty(), "no tag may be created");
  Ok(())
}

#[test]
fn test_push_to_missing_branch_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let _remote = add_origin(&ws)?;

  let output = run_release(&ws.path, &["push-tags", "--branch", "release/9.9"], &[])?;

  assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr(&output));
  Ok(())
}
