// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! A platform module that runs an external build command.
//!
//! ```text
//! scons platform=windows use_mingw=false <extra args...>
//! ^^^^^ ^^^^^^^^^^^^^^^^ ^^^^^^^^^^^^^^^ ^^^^^^^^^^^^^^^^
//! program     args       forwarded keys  after `--`
//! ```
//!
//! The program is resolved against the `PATH` of the build environment, so a
//! patched environment can supply it.

use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::build_env::{BuildEnv, BuildValue};
use super::{PlatformModule, PlatformOptions, USE_MINGW};
use crate::core::process::builder::ProcessBuilder;
use crate::error::{ProcessError, Result};

#[derive(Debug, Clone)]
pub struct CommandPlatform {
    program: String,
    args: Vec<String>,
    forward: Vec<String>,
    extra_args: Vec<String>,
    cwd: Option<PathBuf>,
    cancel: CancellationToken,
}

impl CommandPlatform {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            forward: Vec::new(),
            extra_args: Vec::new(),
            cwd: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Fixed arguments placed right after the program.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Settings passed on as `key=value` when present in the environment.
    #[must_use]
    pub fn with_forward<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forward.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Arguments appended after everything else.
    #[must_use]
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    #[must_use]
    pub fn with_cwd(mut self, cwd: Option<PathBuf>) -> Self {
        self.cwd = cwd;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for `env`.
    #[must_use]
    pub fn command_args(&self, env: &BuildEnv) -> Vec<String> {
        let forwarded = self
            .forward
            .iter()
            .filter_map(|key| env.get(key).map(|value| format!("{key}={value}")));

        self.args
            .iter()
            .cloned()
            .chain(forwarded)
            .chain(self.extra_args.iter().cloned())
            .collect()
    }

    /// Resolves the program against the environment's `PATH`.
    #[must_use]
    pub fn resolve(&self, env: &BuildEnv) -> Option<PathBuf> {
        let cwd = self
            .cwd
            .clone()
            .or_else(|| std::env::current_dir().ok())?;
        ProcessBuilder::find_in(&self.program, env.process().get("PATH"), &cwd)
    }
}

fn option_help(key: &str, program: &str) -> (String, BuildValue) {
    if key == USE_MINGW {
        (
            "Use the MinGW compiler instead of MSVC".to_string(),
            BuildValue::Bool(false),
        )
    } else {
        (format!("Passed to {program} as {key}=<value>"), BuildValue::Str(String::new()))
    }
}

impl PlatformModule for CommandPlatform {
    fn name(&self) -> &str {
        &self.program
    }

    fn options(&self, opts: &mut PlatformOptions) {
        for key in &self.forward {
            let (help, default) = option_help(key, &self.program);
            opts.add(key.clone(), help, default);
        }
    }

    fn exists(&self, env: &BuildEnv) -> bool {
        self.resolve(env).is_some()
    }

    async fn generate(&self, env: &mut BuildEnv) -> Result<()> {
        let program = self
            .resolve(env)
            .ok_or_else(|| ProcessError::ExecutableNotFound {
                name: self.program.clone(),
            })?;

        let mut builder = ProcessBuilder::new(program)
            .args(self.command_args(env))
            .env(env.process().clone())
            .inherit_stdio()
            .name(self.program.clone());
        if let Some(cwd) = &self.cwd {
            builder = builder.cwd(cwd);
        }

        info!(cmd = %builder.command_line(), "running build");
        let output = builder.run_with_cancellation(self.cancel.clone()).await?;
        if output.is_interrupted() {
            return Err(ProcessError::Interrupted {
                command: self.program.clone(),
            }
            .into());
        }
        Ok(())
    }
}
