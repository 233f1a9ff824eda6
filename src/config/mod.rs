// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. msvc-fix.toml (cwd, optional)
//! 3. --config <file> (repeatable)
//! 4. MSVCFIX_* env vars
//! 5. --set section.key=value
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! MSVCFIX_MSVC__ARCH=x86           → msvc.arch = "x86"
//! MSVCFIX_GLOBAL__LOG_FILE=out.log → global.log_file = "out.log"
//! MSVCFIX_DELEGATE__ARGS=a,b       → delegate.args = ["a", "b"]
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigError, FixResult, Result};

use loader::ConfigLoader;
use types::{DelegateConfig, GlobalConfig, MsvcConfig};

/// Name of the configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "msvc-fix.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "MSVCFIX";

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub global: GlobalConfig,
    pub msvc: MsvcConfig,
    pub delegate: DelegateConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use msvc_fix::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("msvc-fix.toml")
    ///     .with_env_prefix("MSVCFIX")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Checks values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first offending key.
    pub fn validate(&self) -> FixResult<()> {
        let invalid = |section: &str, key: &str, message: &str| -> FixResult<()> {
            Err(ConfigError::InvalidValue {
                section: section.to_string(),
                key: key.to_string(),
                message: message.to_string(),
            }
            .into())
        };

        if self.msvc.products.trim().is_empty() {
            return invalid("msvc", "products", "must not be empty");
        }
        if self.msvc.requires.trim().is_empty() {
            return invalid("msvc", "requires", "must not be empty");
        }
        if self.msvc.timeout_secs == Some(0) {
            return invalid("msvc", "timeout_secs", "must be greater than zero");
        }
        if self.delegate.program.trim().is_empty() {
            return invalid("delegate", "program", "must not be empty");
        }
        if let Some(key) = self.delegate.forward.iter().find(|k| k.trim().is_empty()) {
            return invalid(
                "delegate",
                "forward",
                &format!("contains an empty key ('{key}')"),
            );
        }
        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Output is deterministically ordered using `BTreeMap`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_msvc_options(&mut options);
        self.format_delegate_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        if let Some(log_file) = &self.global.log_file {
            options.insert("global.log_file".into(), log_file.display().to_string());
        }
        options.insert(
            "global.log_format".into(),
            format!("{:?}", self.global.log_format).to_lowercase(),
        );
    }

    fn format_msvc_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("msvc.enabled".into(), self.msvc.enabled.to_string());
        if let Some(vswhere) = &self.msvc.vswhere {
            options.insert("msvc.vswhere".into(), vswhere.display().to_string());
        }
        options.insert("msvc.products".into(), self.msvc.products.clone());
        options.insert("msvc.requires".into(), self.msvc.requires.clone());
        options.insert("msvc.arch".into(), self.msvc.arch.to_string());
        if let Some(secs) = self.msvc.timeout_secs {
            options.insert("msvc.timeout_secs".into(), secs.to_string());
        }
    }

    fn format_delegate_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("delegate.program".into(), self.delegate.program.clone());
        options.insert("delegate.args".into(), self.delegate.args.join(" "));
        if let Some(cwd) = &self.delegate.cwd {
            options.insert("delegate.cwd".into(), cwd.display().to_string());
        }
        options.insert("delegate.forward".into(), self.delegate.forward.join(", "));
    }
}
