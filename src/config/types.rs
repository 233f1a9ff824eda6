// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration sections.
//!
//! ```text
//! [global]    logging
//! [msvc]      detection: enabled, vswhere, products, requires, arch, timeout_secs
//! [delegate]  wrapped build command: program, args, cwd, forward
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::core::env::types::Arch;
use crate::core::vs::{VC_TOOLS_COMPONENT, VsQuery};
use crate::logging::{LogFormat, LogLevel};
use crate::platform::USE_MINGW;
use crate::platform::command::CommandPlatform;
use crate::platform::msvc::MsvcOptions;

/// Global configuration options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Log file; no file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
            log_format: LogFormat::Text,
        }
    }
}

/// MSVC detection options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MsvcConfig {
    /// Run detection at all. `use_mingw` is forced off either way.
    pub enabled: bool,
    /// Explicit `vswhere.exe` location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vswhere: Option<PathBuf>,
    /// vswhere `-products` filter.
    pub products: String,
    /// vswhere `-requires` component.
    pub requires: String,
    /// Target architecture for vcvarsall.
    pub arch: Arch,
    /// Limit for each detection subprocess.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for MsvcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            vswhere: None,
            products: "*".to_string(),
            requires: VC_TOOLS_COMPONENT.to_string(),
            arch: Arch::X64,
            timeout_secs: None,
        }
    }
}

impl MsvcConfig {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    #[must_use]
    pub fn query(&self) -> VsQuery {
        VsQuery {
            products: self.products.clone(),
            requires: self.requires.clone(),
            timeout: self.timeout(),
        }
    }

    /// Patcher options from this section.
    #[must_use]
    pub fn options(&self) -> MsvcOptions {
        MsvcOptions::builder()
            .enabled(self.enabled)
            .maybe_vswhere(self.vswhere.clone())
            .query(self.query())
            .arch(self.arch)
            .build()
    }
}

/// The build command wrapped by the patcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DelegateConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; the current one when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    /// Settings passed to the program as `key=value`.
    pub forward: Vec<String>,
}

impl Default for DelegateConfig {
    fn default() -> Self {
        Self {
            program: "scons".to_string(),
            args: vec!["platform=windows".to_string()],
            cwd: None,
            forward: vec![USE_MINGW.to_string()],
        }
    }
}

impl DelegateConfig {
    #[must_use]
    pub fn platform(&self) -> CommandPlatform {
        CommandPlatform::new(self.program.clone())
            .with_args(self.args.iter().cloned())
            .with_forward(self.forward.iter().cloned())
            .with_cwd(self.cwd.clone())
    }
}
