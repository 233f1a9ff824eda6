// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Utility modules.
//!
//! ```text
//! lines
//!   LineBuffer  raw chunks --> complete UTF-8 lines
//! ```

pub mod lines;
