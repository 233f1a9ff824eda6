// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core modules for process and environment management.
//!
//! ```text
//!              core
//!               |
//!     +---------+---------+
//!     |         |         |
//!     v         v         v
//!    env        vs     process
//!     |         |         |
//!   Env      vswhere   Builder
//!   Arch     VsQuery   Output
//!   vcvars   Install   timeout/cancel
//! ```

pub mod env;
pub mod process;
pub mod vs;
