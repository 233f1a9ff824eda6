// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Visual Studio installation discovery via vswhere.
//!
//! ```text
//! vswhere_path(env)  %ProgramFiles(x86)%\Microsoft Visual Studio\Installer\vswhere.exe
//!                    (fallback C:\Program Files (x86))
//!
//! query_installation_path()  -latest -property installationPath --> "C:\VS"
//! find_installations()       -format json --> Vec<VsInstallation>, newest first
//! ```

use crate::core::env::container::Env;
use crate::core::env::vcvars;
use crate::core::process::builder::ProcessBuilder;
use crate::error::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Used when `ProgramFiles(x86)` is not set.
pub const PROGRAM_FILES_X86_FALLBACK: &str = r"C:\Program Files (x86)";

/// Component every returned installation must provide.
pub const VC_TOOLS_COMPONENT: &str = "Microsoft.VisualStudio.Component.VC.Tools.x86.x64";

/// Filters passed to every vswhere invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VsQuery {
    /// `-products` value, `*` for all products including Build Tools.
    pub products: String,
    /// `-requires` component id.
    pub requires: String,
    pub timeout: Option<Duration>,
}

impl Default for VsQuery {
    fn default() -> Self {
        Self {
            products: "*".to_string(),
            requires: VC_TOOLS_COMPONENT.to_string(),
            timeout: None,
        }
    }
}

impl VsQuery {
    fn filter_args(&self) -> [&str; 4] {
        ["-products", &self.products, "-requires", &self.requires]
    }

    /// Full argument list for the installation-path lookup.
    fn installation_path_args(&self) -> Vec<&str> {
        let mut args = vec!["-latest"];
        args.extend(self.filter_args());
        args.extend(["-property", "installationPath", "-utf8"]);
        args
    }
}

/// Visual Studio installation information from vswhere JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsInstallation {
    pub instance_id: String,

    pub installation_path: PathBuf,

    /// Full version string (e.g., "17.14.36915.13").
    pub installation_version: String,

    pub display_name: String,

    /// Whether the installation is complete (no errors or reboot required).
    #[serde(default = "default_true")]
    pub is_complete: bool,

    #[serde(default)]
    pub is_prerelease: bool,
}

const fn default_true() -> bool {
    true
}

impl VsInstallation {
    /// Path to `vcvarsall.bat` inside this installation.
    #[must_use]
    pub fn vcvarsall_path(&self) -> PathBuf {
        vcvars::vcvarsall_path(&self.installation_path)
    }

    /// Numeric (major, minor, patch, build); "17.14" sorts above "17.9".
    fn version_tuple(&self) -> (u32, u32, u32, u32) {
        let mut parts = self
            .installation_version
            .split('.')
            .map(|s| s.parse::<u32>().unwrap_or(0));
        let mut next = || parts.next().unwrap_or(0);
        (next(), next(), next(), next())
    }
}

/// Computes the expected location of `vswhere.exe`.
///
/// `ProgramFiles(x86)` is read from `env`, not from the process, so callers
/// decide which environment the lookup sees.
#[must_use]
pub fn vswhere_path(env: &Env) -> PathBuf {
    let program_files = env
        .get("ProgramFiles(x86)")
        .unwrap_or(PROGRAM_FILES_X86_FALLBACK);

    Path::new(program_files)
        .join("Microsoft Visual Studio")
        .join("Installer")
        .join("vswhere.exe")
}

/// Asks vswhere for the installation path of the latest matching instance.
///
/// Returns the trimmed output, which is empty when nothing matches.
///
/// # Errors
///
/// Returns an error if vswhere cannot be spawned, exits with a non-zero
/// code, or exceeds the query timeout.
pub async fn query_installation_path(vswhere: &Path, query: &VsQuery) -> Result<String> {
    let output = ProcessBuilder::new(vswhere)
        .args(query.installation_path_args())
        .capture_stdout()
        .timeout(query.timeout)
        .name("vswhere")
        .run()
        .await?;

    let path = output.stdout().trim().to_string();
    debug!(path = %path, "vswhere installation path");
    Ok(path)
}

/// Lists all complete, non-prerelease installations, newest first.
///
/// # Errors
///
/// Returns an error if vswhere fails or its JSON output cannot be parsed.
pub async fn find_installations(vswhere: &Path, query: &VsQuery) -> Result<Vec<VsInstallation>> {
    let output = ProcessBuilder::new(vswhere)
        .args(["-format", "json", "-utf8"])
        .args(query.filter_args())
        .capture_stdout()
        .timeout(query.timeout)
        .name("vswhere")
        .run()
        .await
        .context("Failed to run vswhere")?;

    let mut installations = parse_vswhere_json(output.stdout())?;
    installations.retain(|vs| vs.is_complete && !vs.is_prerelease);
    installations.sort_by_key(|vs| std::cmp::Reverse(vs.version_tuple()));

    debug!(count = installations.len(), "found Visual Studio installations");
    Ok(installations)
}

fn parse_vswhere_json(json: &str) -> Result<Vec<VsInstallation>> {
    serde_json::from_str(json).context("Failed to parse vswhere JSON output")
}
