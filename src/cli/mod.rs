// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for msvc-fix using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! msvc-fix [global options] <command>
//! generate [-- extra build args]   detect, patch, run the build
//! env                              detect, patch, print settings
//! locate                           print the vswhere/vcvarsall chain
//! list                             list Visual Studio installations
//! exists | options                 query the wrapped build command
//! config                           show effective configuration
//! version
//! ```

pub mod generate;
pub mod global;
pub mod vs;


use crate::cli::generate::{EnvArgs, GenerateArgs};
use crate::cli::global::GlobalOptions;
use crate::cli::vs::ListArgs;
use clap::{Parser, Subcommand};

/// MSVC toolchain environment patcher.
#[derive(Debug, Parser)]
#[command(
    name = "msvc-fix",
    author,
    version,
    about = "Prefers the MSVC toolchain when building native extensions on Windows",
    long_about = "msvc-fix Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Locates Visual Studio with vswhere, captures the vcvarsall\n\
                  environment, forces use_mingw=false and runs the wrapped build\n\
                  command (scons platform=windows by default) with that\n\
                  environment. Detection problems are reported as warnings and\n\
                  never stop the build.",
    after_help = "CONFIG FILES:\n\n\
                  msvc-fix reads msvc-fix.toml from the current directory when it\n\
                  exists, then every file given with --config, then MSVCFIX_*\n\
                  environment variables (MSVCFIX_MSVC__ARCH=x86), then --set\n\
                  overrides. Use --no-default-config to skip msvc-fix.toml."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Detects MSVC, patches the environment and runs the build command.
    Generate(GenerateArgs),

    /// Detects MSVC and prints the resulting build settings.
    Env(EnvArgs),

    /// Shows where vswhere and vcvarsall are expected and what was found.
    Locate,

    /// Lists Visual Studio installations with the C++ toolset.
    List(ListArgs),

    /// Checks whether the build command can be found.
    Exists,

    /// Lists the options the build command accepts.
    Options,

    /// Lists all configuration values and the files they came from.
    Config,
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
