// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `locate` and `list` commands.
//!
//! ```text
//! locate:  vswhere path --> installation --> vcvarsall.bat, each marked found/missing
//! list:    vswhere -format json, newest first
//! ```

use anyhow::Context;
use std::fmt;
use std::path::PathBuf;

use crate::cli::vs::ListArgs;
use crate::config::Config;
use crate::core::env::types::Arch;
use crate::core::env::vcvars;
use crate::core::vs::{self, VsInstallation};
use crate::error::{FixError, Result};
use crate::platform::HostPlatform;
use crate::platform::build_env::BuildEnv;
use crate::platform::msvc::{MsvcOptions, SystemProbe, ToolchainProbe};

/// What detection would find, step by step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocateReport {
    pub host: HostPlatform,
    pub arch: Arch,
    pub vswhere: PathBuf,
    pub vswhere_found: bool,
    pub installation: Option<PathBuf>,
    /// Script location and whether it exists.
    pub vcvarsall: Option<(PathBuf, bool)>,
}

impl LocateReport {
    /// Walks the detection chain without running vcvarsall.
    ///
    /// # Errors
    ///
    /// Returns an error if vswhere exists but fails.
    pub async fn collect<T: ToolchainProbe>(
        probe: &T,
        host: HostPlatform,
        options: &MsvcOptions,
        env: &BuildEnv,
    ) -> Result<Self> {
        let vswhere = options.vswhere_path(env);
        let vswhere_found = probe.exists(&vswhere);
        let mut report = Self {
            host,
            arch: options.arch(),
            vswhere,
            vswhere_found,
            installation: None,
            vcvarsall: None,
        };
        if !vswhere_found {
            return Ok(report);
        }

        let installation = probe
            .installation_path(&report.vswhere, options.query())
            .await
            .with_context(|| format!("vswhere at '{}' failed", report.vswhere.display()))?;
        if installation.is_empty() {
            return Ok(report);
        }

        let installation = PathBuf::from(installation);
        let script = vcvars::vcvarsall_path(&installation);
        let found = probe.exists(&script);
        report.vcvarsall = Some((script, found));
        report.installation = Some(installation);
        Ok(report)
    }
}

const fn found(exists: bool) -> &'static str {
    if exists { "found" } else { "missing" }
}

impl fmt::Display for LocateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "host          {}", self.host)?;
        writeln!(f, "arch          {}", self.arch)?;
        writeln!(
            f,
            "vswhere       {} ({})",
            self.vswhere.display(),
            found(self.vswhere_found)
        )?;
        if !self.vswhere_found {
            return Ok(());
        }
        match &self.installation {
            Some(path) => writeln!(f, "installation  {}", path.display())?,
            None => writeln!(f, "installation  <none>")?,
        }
        if let Some((script, exists)) = &self.vcvarsall {
            writeln!(f, "vcvarsall     {} ({})", script.display(), found(*exists))?;
        }
        Ok(())
    }
}

/// Prints the detection chain for the current machine.
///
/// # Errors
///
/// Returns an error if vswhere exists but fails.
pub async fn run_locate_command(config: &Config) -> Result<()> {
    let report = LocateReport::collect(
        &SystemProbe,
        HostPlatform::current(),
        &config.msvc.options(),
        &BuildEnv::current(),
    )
    .await?;
    print!("{report}");
    Ok(())
}

/// Lists matching installations.
///
/// # Errors
///
/// Returns an error if vswhere is missing, fails, or prints invalid JSON.
pub async fn run_list_command(args: &ListArgs, config: &Config) -> Result<()> {
    let options = config.msvc.options();
    let vswhere = options.vswhere_path(&BuildEnv::current());
    if !vswhere.is_file() {
        return Err(
            FixError::other(format!("vswhere not found at '{}'", vswhere.display())).into(),
        );
    }

    let installations = vs::find_installations(&vswhere, options.query()).await?;
    print!("{}", format_installations(&installations, args.json)?);
    Ok(())
}

/// Renders installations as text lines or a JSON array.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_installations(installations: &[VsInstallation], json: bool) -> Result<String> {
    use std::fmt::Write as _;

    if json {
        let mut out = serde_json::to_string_pretty(installations)?;
        out.push('\n');
        return Ok(out);
    }
    if installations.is_empty() {
        return Ok("No Visual Studio installations found\n".to_string());
    }

    let mut out = String::new();
    for vs in installations {
        let _ = writeln!(
            out,
            "{} {}  {}",
            vs.display_name,
            vs.installation_version,
            vs.installation_path.display()
        );
    }
    Ok(out)
}
