// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! MSVC auto-setup wrapped around another platform module.
//!
//! ```text
//! MsvcPatcher::generate(env)
//!   |
//!   +-- not win32 / disabled ----------------------+
//!   +-- vswhere.exe missing ----------------------+|
//!   +-- vswhere -latest ... -property installationPath
//!   |     error --> warn!, Failed                 ||
//!   |     ""    --> Skipped(NoInstallation) ------+|
//!   +-- <path>\VC\Auxiliary\Build\vcvarsall.bat   ||
//!   |     missing --> Skipped ---------------------+
//!   +-- vcvarsall <arch> && set                    |
//!   |     error --> warn!, Failed                  |
//!   |     KEY=VALUE --> env.inject()               |
//!   v                                              v
//! env.set("use_mingw", false)  <-------------------+
//!   |
//!   v
//! inner.generate(env)
//! ```

use bon::Builder;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::build_env::BuildEnv;
use super::{HostPlatform, PlatformModule, PlatformOptions, USE_MINGW};
use crate::core::env::types::Arch;
use crate::core::env::vcvars;
use crate::core::vs::{self, VsQuery};
use crate::error::{DetectError, Result};

/// Filesystem and subprocess access used during detection.
#[allow(async_fn_in_trait)]
pub trait ToolchainProbe {
    /// Whether a file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Runs the locator and returns its trimmed stdout.
    async fn installation_path(&self, vswhere: &Path, query: &VsQuery) -> Result<String>;

    /// Runs `vcvarsall` for `arch` and returns its `set` listing.
    async fn vcvars_output(
        &self,
        vcvarsall: &Path,
        arch: Arch,
        timeout: Option<Duration>,
    ) -> Result<String>;
}

/// Probe backed by the real filesystem and processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl ToolchainProbe for SystemProbe {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    async fn installation_path(&self, vswhere: &Path, query: &VsQuery) -> Result<String> {
        vs::query_installation_path(vswhere, query).await
    }

    async fn vcvars_output(
        &self,
        vcvarsall: &Path,
        arch: Arch,
        timeout: Option<Duration>,
    ) -> Result<String> {
        vcvars::capture_vcvarsall(vcvarsall, arch, timeout).await
    }
}

/// Detection settings.
#[derive(Debug, Clone, Builder)]
pub struct MsvcOptions {
    #[builder(default = true)]
    enabled: bool,

    /// Locator path overriding the `ProgramFiles(x86)` lookup.
    vswhere: Option<PathBuf>,

    #[builder(default)]
    query: VsQuery,

    #[builder(default)]
    arch: Arch,
}

impl Default for MsvcOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MsvcOptions {
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub const fn arch(&self) -> Arch {
        self.arch
    }

    #[must_use]
    pub const fn query(&self) -> &VsQuery {
        &self.query
    }

    /// The locator path used for `env`.
    #[must_use]
    pub fn vswhere_path(&self, env: &BuildEnv) -> PathBuf {
        self.vswhere
            .clone()
            .unwrap_or_else(|| vs::vswhere_path(env.process()))
    }
}

/// Why detection did not inject anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotWindows,
    Disabled,
    LocatorMissing(PathBuf),
    NoInstallation,
    VcvarsallMissing(PathBuf),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotWindows => f.write_str("host is not Windows"),
            Self::Disabled => f.write_str("MSVC detection disabled"),
            Self::LocatorMissing(path) => write!(f, "vswhere not found at '{}'", path.display()),
            Self::NoInstallation => f.write_str("no matching Visual Studio installation"),
            Self::VcvarsallMissing(path) => {
                write!(f, "vcvarsall not found at '{}'", path.display())
            }
        }
    }
}

/// Outcome of one detection attempt.
#[derive(Debug, Clone)]
pub enum Detection {
    Skipped(SkipReason),
    Injected { installation: PathBuf, count: usize },
    Failed(DetectError),
}

impl Detection {
    #[must_use]
    pub const fn is_injected(&self) -> bool {
        matches!(self, Self::Injected { .. })
    }

    #[must_use]
    pub const fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Self::Skipped(reason) => Some(reason),
            _ => None,
        }
    }
}

impl std::fmt::Display for Detection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skipped: {reason}"),
            Self::Injected {
                installation,
                count,
            } => write!(
                f,
                "injected {count} variables from '{}'",
                installation.display()
            ),
            Self::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// Wraps a platform module, preparing the MSVC environment before it runs.
#[derive(Debug)]
pub struct MsvcPatcher<P, T = SystemProbe> {
    inner: P,
    probe: T,
    host: HostPlatform,
    options: MsvcOptions,
}

impl<P: PlatformModule> MsvcPatcher<P> {
    /// Patcher for the current host using real processes.
    #[must_use]
    pub fn new(inner: P, options: MsvcOptions) -> Self {
        Self::with_probe(inner, SystemProbe, HostPlatform::current(), options)
    }
}

impl<P: PlatformModule, T: ToolchainProbe> MsvcPatcher<P, T> {
    #[must_use]
    pub const fn with_probe(inner: P, probe: T, host: HostPlatform, options: MsvcOptions) -> Self {
        Self {
            inner,
            probe,
            host,
            options,
        }
    }

    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    #[must_use]
    pub const fn probe(&self) -> &T {
        &self.probe
    }

    #[must_use]
    pub const fn msvc_options(&self) -> &MsvcOptions {
        &self.options
    }

    /// Detects and injects the MSVC environment, then forces `use_mingw`
    /// off. Never fails: problems come back as [`Detection::Failed`] after
    /// being logged.
    pub async fn patch(&self, env: &mut BuildEnv) -> Detection {
        let detection = if !self.host.is_win32() {
            Detection::Skipped(SkipReason::NotWindows)
        } else if !self.options.enabled {
            Detection::Skipped(SkipReason::Disabled)
        } else {
            self.detect(env).await
        };

        match &detection {
            Detection::Failed(err) => warn!("Could not auto-setup MSVC: {err}"),
            Detection::Skipped(reason) => debug!(reason = %reason, "MSVC auto-setup skipped"),
            Detection::Injected { .. } => {}
        }

        env.set(USE_MINGW, false);
        detection
    }

    /// Runs [`patch`](Self::patch) followed by the wrapped module.
    ///
    /// # Errors
    ///
    /// Returns the wrapped module's error; detection problems never fail.
    pub async fn generate_with_report(&self, env: &mut BuildEnv) -> Result<Detection> {
        let detection = self.patch(env).await;
        self.inner.generate(env).await?;
        Ok(detection)
    }

    async fn detect(&self, env: &mut BuildEnv) -> Detection {
        let vswhere = self.options.vswhere_path(env);
        if !self.probe.exists(&vswhere) {
            return Detection::Skipped(SkipReason::LocatorMissing(vswhere));
        }

        let installation = match self
            .probe
            .installation_path(&vswhere, &self.options.query)
            .await
        {
            Ok(path) => path,
            Err(e) => {
                return Detection::Failed(DetectError::LocatorFailed {
                    path: vswhere.display().to_string(),
                    message: format!("{e:#}"),
                });
            }
        };
        if installation.is_empty() {
            return Detection::Skipped(SkipReason::NoInstallation);
        }

        let installation = PathBuf::from(installation);
        let script = vcvars::vcvarsall_path(&installation);
        if !self.probe.exists(&script) {
            return Detection::Skipped(SkipReason::VcvarsallMissing(script));
        }

        let output = match self
            .probe
            .vcvars_output(&script, self.options.arch, self.options.query.timeout)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                return Detection::Failed(DetectError::SetupFailed {
                    script: script.display().to_string(),
                    message: format!("{e:#}"),
                });
            }
        };

        let vars = vcvars::parse_env_output(&output);
        let count = vars.len();
        for (key, value) in vars {
            env.inject(key, value);
        }

        info!(
            installation = %installation.display(),
            arch = %self.options.arch,
            count,
            "injected MSVC environment"
        );
        Detection::Injected {
            installation,
            count,
        }
    }
}

impl<P: PlatformModule, T: ToolchainProbe> PlatformModule for MsvcPatcher<P, T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn options(&self, opts: &mut PlatformOptions) {
        self.inner.options(opts);
    }

    fn exists(&self, env: &BuildEnv) -> bool {
        self.inner.exists(env)
    }

    async fn generate(&self, env: &mut BuildEnv) -> Result<()> {
        self.generate_with_report(env).await.map(|_| ())
    }
}
