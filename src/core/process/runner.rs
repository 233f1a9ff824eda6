// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Process execution and lifecycle management.
//!
//! ```text
//! run() / run_with_cancellation(token)
//!              |
//!              v
//!     build_command()
//!     args, cwd, env, stdio, kill_on_drop
//!              |
//!              v
//!          spawn() + readers
//!              |
//!     wait | timeout (kill) | cancelled (kill)
//!              |
//!              v
//!    validate exit_code (skip if interrupted)
//!              |
//!              v
//!       ProcessOutput
//! ```

use crate::error::{ProcessError, Result};
use anyhow::Context;
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::builder::{ProcessBuilder, ProcessOutput, StreamFlags};
use super::io::{join_reader, spawn_reader};

impl ProcessBuilder {
    /// Returns the display name for this process.
    fn display_name(&self) -> String {
        self.name_override().map_or_else(
            || {
                self.program().file_stem().map_or_else(
                    || "process".to_string(),
                    |s| s.to_string_lossy().into_owned(),
                )
            },
            String::from,
        )
    }

    /// Returns the full command line as a string (for logging).
    pub(crate) fn command_line(&self) -> String {
        use std::fmt::Write as _;

        let mut cmd = self.program().display().to_string();
        for arg in self.args_slice() {
            let arg = arg.to_string_lossy();
            if arg.contains(' ') {
                let _ = write!(cmd, " \"{arg}\"");
            } else {
                let _ = write!(cmd, " {arg}");
            }
        }
        cmd
    }

    /// Spawns and runs the process, waiting for completion.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Spawning the child process fails.
    /// - The timeout elapses.
    /// - The process exits with a non-zero status.
    pub async fn run(self) -> Result<ProcessOutput> {
        self.run_with_cancellation(CancellationToken::new()).await
    }

    /// Spawns and runs the process, killing it when `token` is cancelled.
    ///
    /// An interrupted process returns `Ok` with `is_interrupted() == true`;
    /// the exit code is not validated in that case.
    ///
    /// # Errors
    ///
    /// Same as [`ProcessBuilder::run`].
    pub async fn run_with_cancellation(self, token: CancellationToken) -> Result<ProcessOutput> {
        let name = self.display_name();
        let cmd_line = self.command_line();

        if token.is_cancelled() {
            return Ok(ProcessOutput::new(-1, String::new(), true));
        }

        if let Some(cwd) = self.working_dir() {
            debug!(cwd = %cwd.display(), "cd");
        }
        debug!(cmd = %cmd_line, "exec");

        let mut child = self
            .build_command()
            .spawn()
            .with_context(|| format!("Failed to spawn: {cmd_line}"))?;
        trace!(process = %name, pid = ?child.id(), "spawned");

        let stdout = spawn_reader(child.stdout.take(), self.stdout_flags(), &name, "stdout");
        let stderr = spawn_reader(child.stderr.take(), self.stderr_flags(), &name, "stderr");

        let (status, interrupted) = self.wait(&name, &mut child, &token).await?;

        // stderr is only ever forwarded to the log
        join_reader(stderr).await;
        let output = ProcessOutput::new(
            status.code().unwrap_or(-1),
            join_reader(stdout).await,
            interrupted,
        );

        if !output.is_interrupted() && !output.success() {
            return Err(ProcessError::NonZeroExit {
                command: name,
                code: output.exit_code(),
            }
            .into());
        }

        trace!(
            process = %name,
            exit_code = output.exit_code(),
            interrupted = output.is_interrupted(),
            "completed"
        );
        Ok(output)
    }

    /// Waits for the child, honouring the timeout and the cancellation token.
    async fn wait(
        &self,
        name: &str,
        child: &mut Child,
        token: &CancellationToken,
    ) -> Result<(ExitStatus, bool)> {
        let timeout = async {
            match self.timeout_duration() {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            status = child.wait() => Ok((status?, false)),
            () = timeout => {
                warn!(process = %name, timeout = ?self.timeout_duration(), "process timed out");
                child.kill().await.with_context(|| format!("failed to kill process {name}"))?;
                anyhow::bail!("{name} timed out after {:?}", self.timeout_duration().unwrap_or_default())
            }
            () = token.cancelled() => {
                warn!(process = %name, "cancellation requested, terminating process");
                child.kill().await.ok();
                let status = child
                    .wait()
                    .await
                    .with_context(|| format!("failed waiting for process {name} to exit"))?;
                Ok((status, true))
            }
        }
    }

    /// Builds the tokio Command from this builder's configuration.
    fn build_command(&self) -> Command {
        let mut command = Command::new(self.program());
        command.args(self.args_slice());

        if let Some(cwd) = self.working_dir() {
            command.current_dir(cwd);
        }

        if let Some(env) = self.environment() {
            command.env_clear();
            command.envs(env.iter());
        }

        command.stdin(Stdio::null());
        command.stdout(Self::stdio_from_flags(self.stdout_flags()));
        command.stderr(Self::stdio_from_flags(self.stderr_flags()));
        command.kill_on_drop(true);

        command
    }

    fn stdio_from_flags(flags: StreamFlags) -> Stdio {
        if flags.contains(StreamFlags::INHERIT) {
            Stdio::inherit()
        } else {
            Stdio::piped()
        }
    }
}
