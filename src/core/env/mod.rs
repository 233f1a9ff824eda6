// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Environment variable management.
//!
//! ```text
//! Env (copy-on-write BTreeMap<EnvKey, String>)
//! Sources: current_env(), Env::from_map(), vcvars::parse_env_output()
//! Ops: set/get/remove/iter
//! ```
//!
//! - **Case-insensitive keys**, as on Windows
//! - **Copy-on-write**: clones share data until modified
//! - **UTF-8 internal**: decoding happens at process I/O boundaries

pub mod container;
pub mod types;
pub mod vcvars;


/// Captures the current process environment.
///
/// Variables that are not valid Unicode are skipped.
#[must_use]
pub fn current_env() -> container::Env {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}
