// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Async process spawning and management.
//!
//! ```text
//! ProcessBuilder::new("vswhere.exe")
//!   .args() .cwd() .env() .capture_stdout() .timeout()
//!   .run() / .run_with_cancellation()
//!       --> tokio::process::Command
//!           split stdout/stderr into lines
//!       --> ProcessOutput { exit_code, stdout, interrupted }
//! ```

pub mod builder;
mod io;
mod runner;
#[cfg(test)]
mod tests;
