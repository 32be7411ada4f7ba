//! System git backend for the release gate
//!
//! All mutations go through git plumbing/porcelain via the [`Shell`] primitive:
//! `status --porcelain` for the clean-worktree gate, `add` + `commit` for the
//! version bump, and `tag` / `remote` / `push` for the push-tags step.

use crate::core::error::{GitError, ReleaseError, ReleaseResult};
use crate::core::shell::{CommandError, Shell, ShellCommand, ShellOutput};
use std::path::{Path, PathBuf};

/// Git operations rooted at a workspace
pub struct Git<'a> {
  shell: &'a dyn Shell,

  /// Working tree root
  work_tree: PathBuf,
}

impl<'a> Git<'a> {
  /// Open the repository containing `path`, resolving its top-level directory
  pub fn open(shell: &'a dyn Shell, path: &Path) -> ReleaseResult<Self> {
    let output = shell
      .run(
        &ShellCommand::new("git")
          .arg("-C")
          .arg(path.to_string_lossy())
          .args(["rev-parse", "--show-toplevel"]),
      )
      .map_err(|e| {
        if e.stderr.contains("not a git repository") {
          ReleaseError::Git(GitError::RepoNotFound {
            path: path.to_path_buf(),
          })
        } else {
          command_failed(e)
        }
      })?;

    Ok(Self {
      shell,
      work_tree: PathBuf::from(output.stdout.trim()),
    })
  }

  /// Use `work_tree` as-is without asking git for the top level
  #[cfg(test)]
  pub fn at(shell: &'a dyn Shell, work_tree: &Path) -> Self {
    Self {
      shell,
      work_tree: work_tree.to_path_buf(),
    }
  }

  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Fail unless `git status --porcelain` prints nothing
  ///
  /// Staged, unstaged and untracked changes all block a release.
  pub fn ensure_clean_worktree(&self) -> ReleaseResult<()> {
    let output = self.git(&["status", "--porcelain"])?;
    let changes: Vec<String> = output
      .stdout
      .lines()
      .filter(|line| !line.trim().is_empty())
      .map(str::to_string)
      .collect();

    if !changes.is_empty() {
      return Err(ReleaseError::DirtyWorktree {
        root: self.work_tree.clone(),
        changes,
      });
    }

    Ok(())
  }

  /// Stage exactly `paths` and commit them with `message`
  pub fn commit_version_bump(&self, paths: &[PathBuf], message: &str) -> ReleaseResult<()> {
    let mut add = vec!["add".to_string(), "--".to_string()];
    add.extend(paths.iter().map(|p| path_to_git_format(p)));
    self.git(add.as_slice())?;

    self.git(&["commit", "-m", message])?;
    Ok(())
  }

  /// Subject line of the HEAD commit
  pub fn head_subject(&self) -> ReleaseResult<String> {
    let output = self.git(&["log", "-1", "--format=%s"])?;
    Ok(output.stdout.trim().to_string())
  }

  /// Whether `path` is excluded by .gitignore (and so cannot be staged)
  pub fn is_ignored(&self, path: &Path) -> ReleaseResult<bool> {
    let path = path_to_git_format(path);
    match self.shell.run(&self.git_cmd(&["check-ignore", "--", path.as_str()])) {
      Ok(output) => Ok(!output.stdout.trim().is_empty()),
      // Exit status 1: not ignored
      Err(e) if e.code == Some(1) && e.stderr.trim().is_empty() => Ok(false),
      Err(e) => Err(command_failed(e)),
    }
  }

  /// Create an annotated tag at HEAD
  pub fn create_annotated_tag(&self, tag: &str, message: &str) -> ReleaseResult<()> {
    self.git(&["tag", "-a", tag, "-m", message])?;
    Ok(())
  }

  /// Point origin's push URL at `url`
  pub fn set_push_url(&self, url: &str) -> ReleaseResult<()> {
    self.git(&["remote", "set-url", "--push", "origin", url])?;
    Ok(())
  }

  /// Push `branch` to origin and track it
  pub fn push_branch(&self, branch: &str) -> ReleaseResult<()> {
    self.git(&["push", "--set-upstream", "origin", branch])?;
    Ok(())
  }

  /// Push all tags to origin
  pub fn push_tags(&self) -> ReleaseResult<()> {
    self.git(&["push", "origin", "--tags"])?;
    Ok(())
  }

  fn git<S: AsRef<str>>(&self, args: &[S]) -> ReleaseResult<ShellOutput> {
    self.shell.run(&self.git_cmd(args)).map_err(command_failed)
  }

  /// Build a git command against the work tree
  ///
  /// - Runs from the work tree root
  /// - Disables path quoting so porcelain output keeps non-ASCII names
  fn git_cmd<S: AsRef<str>>(&self, args: &[S]) -> ShellCommand {
    ShellCommand::new("git")
      .current_dir(&self.work_tree)
      .args(["-c", "core.quotePath=false"])
      .args(args.iter().map(|a| a.as_ref().to_string()))
  }
}

fn command_failed(err: CommandError) -> ReleaseError {
  ReleaseError::Git(GitError::CommandFailed {
    command: err.command,
    stderr: err.stderr,
  })
}

/// Convert a path to Git format (always forward slashes)
pub fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}
