//! Integration tests for `registry-release publish`
//!
//! Every case here stops before the registry is contacted.

use crate::helpers::{TestWorkspace, run_release, stderr};
use anyhow::Result;

const TOKEN: (&str, &str) = ("CARGO_REGISTRY_TOKEN", "test-token");

fn workspace_with_app() -> Result<TestWorkspace> {
  let ws = TestWorkspace::new()?;
  ws.add_crate("shared-lib", "1.0.0", &[])?;
  ws.add_crate("app", "1.0.0", &[("shared-lib", r#"{ path = "../shared-lib", version = "1.0.0" }"#)])?;
  ws.commit("feat: add app")?;
  Ok(ws)
}

#[test]
fn test_dirty_worktree_blocks_publish() -> Result<()> {
  let ws = workspace_with_app()?;
  ws.write_file("crates/app/src/lib.rs", "pub fn changed() {}\n")?;

  let output = run_release(
    &ws.path,
    &["publish", "--project-root", "crates/app", "--release-version", "1.1.0"],
    &[TOKEN],
  )?;

  assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr(&output));
  assert!(stderr(&output).contains("is not clean"));
  assert!(stderr(&output).contains("crates/app/src/lib.rs"));
  assert_eq!(ws.git_log(10)?.len(), 2, "no commit may be created");
  Ok(())
}

#[test]
fn test_missing_token_fails_validation() -> Result<()> {
  let ws = workspace_with_app()?;

  let output = run_release(
    &ws.path,
    &["publish", "--project-root", "crates/app", "--release-version", "1.1.0"],
    &[],
  )?;

  assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr(&output));
  assert!(stderr(&output).contains("CARGO_REGISTRY_TOKEN"));
  Ok(())
}

#[test]
fn test_invalid_release_version() -> Result<()> {
  let ws = workspace_with_app()?;

  let output = run_release(
    &ws.path,
    &["publish", "--project-root", "crates/app", "--release-version", "1.1"],
    &[TOKEN],
  )?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("could not parse version \"1.1\""));
  Ok(())
}

#[test]
fn test_link_problems_reported_together() -> Result<()> {
  let ws = workspace_with_app()?;

  let output = run_release(
    &ws.path,
    &[
      "publish",
      "--project-root",
      "crates/app",
      "--release-version",
      "1.1.0",
      "--link",
      "runtimes=shared-lib",
      "--link",
      "peer=shared-lib",
    ],
    &[TOKEN],
  )?;

  let err = stderr(&output);
  assert_eq!(output.status.code(), Some(1));
  assert!(err.contains("unknown dependency category 'runtimes'"), "stderr: {}", err);
  assert!(err.contains("cargo has no peer dependency section"), "stderr: {}", err);
  Ok(())
}

#[test]
fn test_release_toml_unknown_field() -> Result<()> {
  let ws = workspace_with_app()?;
  ws.write_file("crates/app/release.toml", "release_version = \"1.1.0\"\npoll_interval = 5\n")?;
  ws.commit("chore: release config")?;

  let output = run_release(&ws.path, &["publish", "--project-root", "crates/app"], &[TOKEN])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("release.toml"));
  Ok(())
}

#[test]
fn test_release_version_from_config_then_dirty() -> Result<()> {
  let ws = workspace_with_app()?;
  ws.write_file(
    "crates/app/.release.toml",
    "release_version = \"1.1.0\"\n\n[linked_dependencies]\nruntime = [\"shared-lib\"]\n",
  )?;
  ws.commit("chore: release config")?;
  ws.write_file("untracked.txt", "pending\n")?;

  let output = run_release(&ws.path, &["publish", "--project-root", "crates/app"], &[TOKEN])?;

  assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr(&output));
  assert!(stderr(&output).contains("untracked.txt"));
  Ok(())
}

#[test]
fn test_npm_package_detected_and_gated() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_package("web", "0.3.0")?;
  ws.commit("feat: add web")?;
  ws.write_file("packages/web/index.js", "module.exports = {};\n")?;

  let output = run_release(
    &ws.path,
    &["publish", "--project-root", "packages/web", "--release-version", "0.4.0"],
    &[],
  )?;

  assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr(&output));
  Ok(())
}

#[test]
fn test_unknown_registry_layout() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("docs/guide.md", "# guide\n")?;
  ws.commit("docs")?;

  let output = run_release(
    &ws.path,
    &["publish", "--project-root", "docs", "--release-version", "1.0.0"],
    &[TOKEN],
  )?;

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Could not detect the package registry"));
  Ok(())
}
