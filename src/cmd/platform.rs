// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `exists` and `options`: queries answered by the wrapped build command.

use crate::config::Config;
use crate::error::{FixError, Result};
use crate::platform::build_env::BuildEnv;
use crate::platform::msvc::MsvcPatcher;
use crate::platform::{PlatformModule, PlatformOptions};

fn patcher(config: &Config) -> MsvcPatcher<crate::platform::command::CommandPlatform> {
    MsvcPatcher::new(config.delegate.platform(), config.msvc.options())
}

/// Succeeds when the build command resolves against the current `PATH`.
///
/// # Errors
///
/// Returns an error naming the program when it cannot be found.
pub fn run_exists_command(config: &Config) -> Result<()> {
    let patcher = patcher(config);
    let env = BuildEnv::current();

    if patcher.exists(&env) {
        println!("{}: found", patcher.name());
        Ok(())
    } else {
        Err(FixError::other(format!("build command '{}' not found", patcher.name())).into())
    }
}

/// Prints the options declared by the build command.
pub fn run_options_command(config: &Config) {
    let mut opts = PlatformOptions::new();
    patcher(config).options(&mut opts);

    for line in format_options_table(&opts) {
        println!("{line}");
    }
}

/// One aligned line per option: name, help and default.
#[must_use]
pub fn format_options_table(opts: &PlatformOptions) -> Vec<String> {
    let width = opts.iter().map(|d| d.name.len()).max().unwrap_or(0);
    opts.iter()
        .map(|d| format!("{:<width$}  {} (default: {})", d.name, d.help, d.default))
        .collect()
}
