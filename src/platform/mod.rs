// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Platform modules: the seam between environment patching and the build.
//!
//! ```text
//!            PlatformModule
//!     options(opts) / exists(env) / generate(env)
//!                 |
//!       +---------+----------+
//!       v                    v
//!  MsvcPatcher<P>       CommandPlatform
//!  detect + inject      runs `scons platform=windows ...`
//!  use_mingw = false
//!  then P::generate
//! ```

pub mod build_env;
pub mod command;
pub mod msvc;

#[cfg(test)]
mod tests;

use crate::error::Result;
use build_env::{BuildEnv, BuildValue};

/// Setting that selects MinGW over MSVC in the wrapped build.
pub const USE_MINGW: &str = "use_mingw";

/// Host operating system, named the way build scripts name it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Win32,
    Linux,
    Darwin,
    Other,
}

impl HostPlatform {
    /// The platform this binary is running on.
    #[must_use]
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Self::Win32,
            "linux" => Self::Linux,
            "macos" => Self::Darwin,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn is_win32(self) -> bool {
        matches!(self, Self::Win32)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Win32 => "win32",
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A build option a platform module understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDecl {
    pub name: String,
    pub help: String,
    pub default: BuildValue,
}

/// Options collected from platform modules.
#[derive(Debug, Clone, Default)]
pub struct PlatformOptions {
    decls: Vec<OptionDecl>,
}

impl PlatformOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an option; a later declaration of the same name replaces it.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        default: impl Into<BuildValue>,
    ) -> &mut Self {
        let decl = OptionDecl {
            name: name.into(),
            help: help.into(),
            default: default.into(),
        };
        if let Some(existing) = self.decls.iter_mut().find(|d| d.name == decl.name) {
            *existing = decl;
        } else {
            self.decls.push(decl);
        }
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionDecl> {
        self.decls.iter().find(|d| d.name == name)
    }

    /// Declarations in the order they were first added.
    pub fn iter(&self) -> impl Iterator<Item = &OptionDecl> {
        self.decls.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// A platform module of the build: declares options, reports availability
/// and configures/runs the build for a given environment.
#[allow(async_fn_in_trait)]
pub trait PlatformModule {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Adds this module's options to `opts`.
    fn options(&self, opts: &mut PlatformOptions);

    /// Whether the module can work in `env`.
    fn exists(&self, env: &BuildEnv) -> bool;

    /// Applies the module to `env`.
    ///
    /// # Errors
    ///
    /// Returns an error if the module fails to generate the build.
    async fn generate(&self, env: &mut BuildEnv) -> Result<()>;
}
