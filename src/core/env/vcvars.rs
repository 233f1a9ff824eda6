// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Visual Studio environment capture through `vcvarsall.bat`.
//!
//! ```text
//! <install>\VC\Auxiliary\Build\vcvarsall.bat
//!   --> temp wrapper.bat
//!         chcp 65001 >nul
//!         call "vcvarsall.bat" <arch>
//!         if errorlevel 1 exit /b 1
//!         set
//!   --> cmd /d /c wrapper.bat  (UTF-8)
//!   --> parse_env_output(): KEY=VALUE, split at first '='
//! ```

use super::types::Arch;
use crate::core::process::builder::ProcessBuilder;
use crate::error::{FixError, Result};
use anyhow::Context;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{Level, debug, enabled, trace};

/// Location of `vcvarsall.bat` below an installation root.
#[must_use]
pub fn vcvarsall_path(installation: &Path) -> PathBuf {
    installation
        .join("VC")
        .join("Auxiliary")
        .join("Build")
        .join("vcvarsall.bat")
}

/// Batch wrapper that runs `set` only when vcvarsall succeeded.
///
/// Going through a file sidesteps `cmd.exe` re-parsing quotes in `/c`. The
/// console is switched to UTF-8 first so `set` does not write values in the
/// OEM code page.
pub(super) fn wrapper_script(vcvarsall: &Path, arch: Arch) -> String {
    format!(
        "@echo off\r\nchcp 65001 >nul\r\ncall \"{}\" {}\r\nif errorlevel 1 exit /b 1\r\nset\r\n",
        vcvarsall.display(),
        arch.vcvars_arg()
    )
}

/// Runs `vcvarsall.bat` for `arch` and returns everything it printed,
/// followed by the resulting `set` listing.
///
/// # Errors
///
/// Returns an error if the wrapper script cannot be written, `cmd` cannot be
/// spawned, vcvarsall fails, or the timeout elapses.
pub async fn capture_vcvarsall(
    vcvarsall: &Path,
    arch: Arch,
    timeout: Option<Duration>,
) -> Result<String> {
    debug!(script = %vcvarsall.display(), arch = %arch, "running vcvarsall");

    let mut wrapper = tempfile::Builder::new()
        .prefix("msvc-fix-")
        .suffix(".bat")
        .tempfile()
        .map_err(FixError::from)
        .context("Failed to create vcvarsall wrapper script")?;
    wrapper
        .write_all(wrapper_script(vcvarsall, arch).as_bytes())
        .map_err(FixError::from)
        .context("Failed to write vcvarsall wrapper script")?;
    // close our handle; the file is removed when `wrapper` drops
    let wrapper = wrapper.into_temp_path();

    let output = ProcessBuilder::new("cmd")
        .args(["/d", "/c"])
        .arg(&*wrapper)
        .capture_stdout()
        .timeout(timeout)
        .name("vcvarsall")
        .run()
        .await?;

    Ok(output.stdout().to_string())
}

/// Parses `KEY=VALUE` lines.
///
/// Lines are split at the first `=`, so values keep any further `=`. Lines
/// without `=` are skipped, as are lines whose key is blank once trimmed.
/// Pairs are returned in input order; callers applying them in order get
/// last-occurrence-wins semantics.
#[must_use]
pub fn parse_env_output(text: &str) -> Vec<(String, String)> {
    let mut vars = Vec::new();

    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        if enabled!(Level::TRACE) {
            trace!(key = key, value = value, "captured env var");
        }
        vars.push((key.to_string(), value.to_string()));
    }

    debug!(count = vars.len(), "parsed environment variables");
    vars
}
