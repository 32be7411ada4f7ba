//! Subprocess execution
//!
//! Every external tool (git, cargo, npm) runs through the [`Shell`] trait so the
//! release sequence can be exercised against an in-memory recorder. The system
//! implementation echoes the command line, streams the child's output to the
//! terminal while capturing it, and fails on a non-zero exit.

use std::fmt;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A program invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellCommand {
  pub program: String,
  pub args: Vec<String>,
  pub cwd: Option<PathBuf>,
  pub stdin: Option<String>,
  pub envs: Vec<(String, String)>,
  /// Values masked when the command line is displayed
  pub secrets: Vec<String>,
}

impl ShellCommand {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      ..Default::default()
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.cwd = Some(dir.as_ref().to_path_buf());
    self
  }

  #[cfg(test)]
  pub fn stdin(mut self, input: impl Into<String>) -> Self {
    self.stdin = Some(input.into());
    self
  }

  /// Set an environment variable whose value is a secret
  pub fn secret_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    let value = value.into();
    self.secrets.push(value.clone());
    self.envs.push((key.into(), value));
    self
  }

  /// Command line with secrets masked, e.g. `cargo add shared-lib@3.0.0`
  pub fn display(&self) -> String {
    let mut line = self.program.clone();
    for arg in &self.args {
      line.push(' ');
      if self.secrets.iter().any(|s| !s.is_empty() && arg.contains(s.as_str())) {
        line.push_str("***");
      } else {
        line.push_str(arg);
      }
    }
    line
  }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
  pub stdout: String,
  pub stderr: String,
}

/// A command exited non-zero or could not be started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
  pub command: String,
  /// Exit code, `None` when killed by a signal or never started
  pub code: Option<i32>,
  pub stderr: String,
}

impl fmt::Display for CommandError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.code {
      Some(code) => write!(f, "`{}` returned non zero exit code {}", self.command, code)?,
      None => write!(f, "`{}` did not complete", self.command)?,
    }
    if !self.stderr.trim().is_empty() {
      write!(f, "\n{}", self.stderr.trim_end())?;
    }
    Ok(())
  }
}

impl std::error::Error for CommandError {}

/// Subprocess primitive
pub trait Shell {
  fn run(&self, command: &ShellCommand) -> Result<ShellOutput, CommandError>;
}

/// Runs commands as real child processes
pub struct SystemShell;

impl Shell for SystemShell {
  fn run(&self, command: &ShellCommand) -> Result<ShellOutput, CommandError> {
    let line = command.display();
    tracing::info!("+ {}", line);

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args);
    if let Some(cwd) = &command.cwd {
      cmd.current_dir(cwd);
    }
    for (key, value) in &command.envs {
      cmd.env(key, value);
    }
    cmd
      .stdin(if command.stdin.is_some() { Stdio::piped() } else { Stdio::null() })
      .stdout(Stdio::piped())
      .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| CommandError {
      command: line.clone(),
      code: None,
      stderr: format!("failed to start {}: {}", command.program, e),
    })?;

    if let Some(input) = &command.stdin
      && let Some(mut stdin) = child.stdin.take()
    {
      // Dropping the handle closes the pipe so the child sees EOF
      stdin.write_all(input.as_bytes()).map_err(|e| CommandError {
        command: line.clone(),
        code: None,
        stderr: format!("failed to write stdin: {}", e),
      })?;
    }

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let (stdout, stderr) = std::thread::scope(|scope| {
      let out = scope.spawn(|| tee(stdout, std::io::stdout()));
      let err = scope.spawn(|| tee(stderr, std::io::stderr()));
      (out.join().unwrap_or_default(), err.join().unwrap_or_default())
    });

    let status = child.wait().map_err(|e| CommandError {
      command: line.clone(),
      code: None,
      stderr: format!("failed to wait for {}: {}", command.program, e),
    })?;

    if !status.success() {
      return Err(CommandError {
        command: line,
        code: status.code(),
        stderr,
      });
    }

    Ok(ShellOutput { stdout, stderr })
  }
}

/// Copy a child stream line by line to `sink`, returning everything read
fn tee<R: Read, W: Write>(source: Option<R>, mut sink: W) -> String {
  let Some(source) = source else {
    return String::new();
  };

  let mut captured = String::new();
  let mut reader = BufReader::new(source);
  let mut line = Vec::new();
  loop {
    line.clear();
    match reader.read_until(b'\n', &mut line) {
      Ok(0) | Err(_) => break,
      Ok(_) => {
        let _ = sink.write_all(&line);
        captured.push_str(&String::from_utf8_lossy(&line));
      }
    }
  }
  let _ = sink.flush();
  captured
}
