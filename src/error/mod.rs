// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!          FixError (~24 bytes)
//!                 |
//!   +-------+-----+------+-------+
//!   |       |     |      |       |
//!   v       v     v      v       v
//! Config  Detect Process Io    Other
//!  Box     Box    Box    Box   Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Config   ParseError, InvalidValue
//!   Detect   LocatorFailed, SetupFailed
//!   Process  ExecutableNotFound, NonZeroExit, Interrupted
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`FixError`].
pub type FixResult<T> = std::result::Result<T, FixError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum FixError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Toolchain detection failed.
    #[error("detection error: {0}")]
    Detect(#[from] Box<DetectError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

impl FixError {
    /// Create a [`FixError::Other`] from a message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into().into_boxed_str())
    }
}

macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for FixError {
                fn from(err: $error) -> Self {
                    FixError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    ConfigError => Config,
    DetectError => Detect,
    ProcessError => Process,
    std::io::Error => Io,
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse a configuration source.
    #[error("failed to parse config '{source_name}': {message}")]
    ParseError {
        source_name: String,
        message: String,
    },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Detection Errors ---

/// Failures of the MSVC auto-setup chain.
///
/// These never abort a build: the patcher turns them into a warning and a
/// `Detection::Failed` value.
#[derive(Debug, Clone, Error)]
pub enum DetectError {
    /// `vswhere.exe` could not be run or reported a failure.
    #[error("vswhere at '{path}' failed: {message}")]
    LocatorFailed { path: String, message: String },

    /// `vcvarsall.bat` could not be run or reported a failure.
    #[error("vcvarsall at '{script}' failed: {message}")]
    SetupFailed { script: String, message: String },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Process exited with a non-zero status.
    #[error("process '{command}' exited with code {code}")]
    NonZeroExit { command: String, code: i32 },

    /// Process was interrupted before it finished.
    #[error("process '{command}' was interrupted")]
    Interrupted { command: String },
}
