// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   generate, env       MsvcPatcher<CommandPlatform>
//!   locate, list        vswhere / vcvarsall queries
//!   exists, options     forwarded to the build command
//!   config
//! ```

pub mod config;
pub mod generate;
pub mod platform;
pub mod vs;
