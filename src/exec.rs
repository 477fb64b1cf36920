//! External command execution.
//!
//! Every subprocess the pipeline starts (git queries, git mutations, hooks,
//! custom changelog commands) goes through a [`CommandRunner`]. The real
//! implementation spawns processes with tokio and caps how much output it keeps.

use crate::error::{GitError, Result};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Default cap on captured bytes per output stream
pub const DEFAULT_OUTPUT_LIMIT: usize = 64 * 1024;

/// A command to execute: either a program with arguments or a shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    kind: InvocationKind,
    envs: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InvocationKind {
    Program { program: String, args: Vec<String> },
    Shell { line: String },
}

impl Invocation {
    /// Run `program` directly with `args`
    pub fn program<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: InvocationKind::Program {
                program: program.into(),
                args: args.into_iter().map(Into::into).collect(),
            },
            envs: Vec::new(),
        }
    }

    /// Run a git subcommand
    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::program("git", args)
    }

    /// Run a line through the platform shell
    pub fn shell(line: impl Into<String>) -> Self {
        Self {
            kind: InvocationKind::Shell { line: line.into() },
            envs: Vec::new(),
        }
    }

    /// Add an environment variable for the child process
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Environment variables added to this invocation
    pub fn envs(&self) -> &[(String, String)] {
        &self.envs
    }

    /// True for shell lines
    pub fn is_shell(&self) -> bool {
        matches!(self.kind, InvocationKind::Shell { .. })
    }

    /// Command line as an operator would type it
    pub fn command_line(&self) -> String {
        self.to_string()
    }

    fn to_command(&self) -> Command {
        let mut cmd = match &self.kind {
            InvocationKind::Program { program, args } => {
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
            InvocationKind::Shell { line } => shell_command(line),
        };
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            InvocationKind::Program { program, args } => {
                f.write_str(program)?;
                for arg in args {
                    if arg.is_empty() || arg.contains(char::is_whitespace) {
                        write!(f, " '{arg}'")?;
                    } else {
                        write!(f, " {arg}")?;
                    }
                }
                Ok(())
            }
            InvocationKind::Shell { line } => f.write_str(line),
        }
    }
}

#[cfg(windows)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured stdout (lossy UTF-8, possibly truncated)
    pub stdout: String,
    /// Captured stderr (lossy UTF-8, possibly truncated)
    pub stderr: String,
    /// Exit code; `None` when terminated by a signal
    pub code: Option<i32>,
    /// Whether either stream exceeded the capture limit
    pub truncated: bool,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            code: Some(0),
            ..Default::default()
        }
    }

    /// Failed output with the given exit code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stderr: stderr.into(),
            code: Some(code),
            ..Default::default()
        }
    }

    /// True when the process exited with status 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Best diagnostic text: stderr, or stdout when stderr is empty
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Executes external commands.
///
/// Implementations return `Ok` for any process that ran to completion,
/// whatever its exit status; `Err` means the process could not be run at all.
pub trait CommandRunner {
    /// Execute the invocation and wait for it to finish
    fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<CommandOutput>>;
}

impl<T: CommandRunner> CommandRunner for &T {
    fn run(&self, invocation: &Invocation) -> impl Future<Output = Result<CommandOutput>> {
        (**self).run(invocation)
    }
}

/// Runs commands as child processes of this one
#[derive(Debug, Clone)]
pub struct SystemRunner {
    working_dir: PathBuf,
    output_limit: usize,
}

impl SystemRunner {
    /// Create a runner rooted at `working_dir`.
    ///
    /// Fails early when no `git` executable can be found.
    pub fn new(working_dir: impl AsRef<Path>) -> Result<Self> {
        which::which("git").map_err(|e| GitError::NotInstalled {
            reason: e.to_string(),
        })?;

        Ok(Self {
            working_dir: working_dir.as_ref().to_path_buf(),
            output_limit: DEFAULT_OUTPUT_LIMIT,
        })
    }

    /// Override the per-stream capture limit
    pub fn with_output_limit(mut self, limit: usize) -> Self {
        self.output_limit = limit;
        self
    }
}

impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        log::debug!("exec: {invocation}");

        let mut cmd = invocation.to_command();
        cmd.current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let spawn_error = |e: std::io::Error| GitError::SpawnFailed {
            command: invocation.command_line(),
            reason: e.to_string(),
        };

        let mut child = cmd.spawn().map_err(spawn_error)?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Both pipes are drained concurrently so a chatty child never blocks on a full pipe.
        let (stdout, stderr) = tokio::join!(
            read_capped(stdout, self.output_limit),
            read_capped(stderr, self.output_limit),
        );
        let (stdout, stdout_truncated) = stdout.map_err(spawn_error)?;
        let (stderr, stderr_truncated) = stderr.map_err(spawn_error)?;

        let status = child.wait().await.map_err(spawn_error)?;

        let truncated = stdout_truncated || stderr_truncated;
        if truncated {
            log::warn!(
                "output of `{invocation}` exceeded {} bytes and was truncated",
                self.output_limit
            );
        }

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            code: status.code(),
            truncated,
        })
    }
}

/// Read a stream to EOF, keeping at most `limit` bytes.
async fn read_capped<R>(reader: Option<R>, limit: usize) -> std::io::Result<(Vec<u8>, bool)>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok((Vec::new(), false));
    };

    let mut kept = Vec::new();
    let mut truncated = false;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let room = limit.saturating_sub(kept.len());
        if n > room {
            truncated = true;
        }
        kept.extend_from_slice(&chunk[..n.min(room)]);
    }

    Ok((kept, truncated))
}
