// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! The build environment handed through platform modules.
//!
//! ```text
//! BuildEnv
//!   settings: BTreeMap<String, BuildValue>   use_mingw=false, INCLUDE=...
//!   process:  Env                            what spawned builds see
//!
//! inject(k, v) --> settings[k] = v  +  process[k] = v
//! ```

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::env::container::Env;
use crate::core::env::current_env;

/// A build setting value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BuildValue {
    Bool(bool),
    Str(String),
}

impl BuildValue {
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Str(_) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Bool(_) => None,
        }
    }
}

impl std::fmt::Display for BuildValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for BuildValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for BuildValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for BuildValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

/// Per-invocation build configuration.
///
/// Settings are case-sensitive like build-system variables; the process
/// environment follows Windows rules (see [`Env`]).
#[derive(Debug, Clone, Default)]
pub struct BuildEnv {
    settings: BTreeMap<String, BuildValue>,
    process: Env,
}

impl BuildEnv {
    /// An empty environment: no settings, no process variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_process(process: Env) -> Self {
        Self {
            settings: BTreeMap::new(),
            process,
        }
    }

    /// Seeds the process variables from the running process.
    #[must_use]
    pub fn current() -> Self {
        Self::with_process(current_env())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<BuildValue>) -> &mut Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&BuildValue> {
        self.settings.get(key)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(BuildValue::as_bool)
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(BuildValue::as_str)
    }

    /// Writes a discovered variable into both the settings and the process
    /// environment.
    pub fn inject(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        self.process.set(key.clone(), value.clone());
        self.settings.insert(key, BuildValue::Str(value));
        self
    }

    /// Settings in key order.
    pub fn settings(&self) -> impl Iterator<Item = (&str, &BuildValue)> {
        self.settings.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub const fn settings_map(&self) -> &BTreeMap<String, BuildValue> {
        &self.settings
    }

    #[must_use]
    pub const fn process(&self) -> &Env {
        &self.process
    }

    pub const fn process_mut(&mut self) -> &mut Env {
        &mut self.process
    }
}
