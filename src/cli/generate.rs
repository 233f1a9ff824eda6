// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Arguments of the commands that run detection.
//!
//! ```text
//! generate [-a ARCH] [--vswhere PATH] [--no-detect] [-- EXTRA...]
//! env      [-a ARCH] [--vswhere PATH] [--no-detect] [--json]
//! ```

use clap::Args;
use std::path::PathBuf;

use crate::core::env::types::Arch;

/// Detection overrides shared by `generate` and `env`.
#[derive(Debug, Clone, Default, Args)]
pub struct DetectArgs {
    /// Target architecture for vcvarsall (x86, x64, arm64).
    #[arg(short = 'a', long = "arch", value_name = "ARCH")]
    pub arch: Option<Arch>,

    /// Explicit path to vswhere.exe.
    #[arg(long = "vswhere", value_name = "PATH")]
    pub vswhere: Option<PathBuf>,

    /// Skips MSVC detection; `use_mingw` is still forced off.
    #[arg(long = "no-detect")]
    pub no_detect: bool,
}

/// Arguments for the `generate` command.
#[derive(Debug, Clone, Default, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub detect: DetectArgs,

    /// Arguments appended to the build command.
    #[arg(last = true, value_name = "EXTRA")]
    pub extra: Vec<String>,
}

/// Arguments for the `env` command.
#[derive(Debug, Clone, Default, Args)]
pub struct EnvArgs {
    #[command(flatten)]
    pub detect: DetectArgs,

    /// Prints the settings as a JSON object.
    #[arg(long)]
    pub json: bool,
}
