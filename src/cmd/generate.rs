// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `generate` and `env` commands.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::generate::{DetectArgs, EnvArgs, GenerateArgs};
use crate::config::Config;
use crate::error::{ProcessError, Result};
use crate::platform::PlatformModule;
use crate::platform::build_env::BuildEnv;
use crate::platform::msvc::{Detection, MsvcOptions, MsvcPatcher, ToolchainProbe};

/// Patcher options from configuration with command-line overrides applied.
#[must_use]
pub fn msvc_options(config: &Config, args: &DetectArgs) -> MsvcOptions {
    MsvcOptions::builder()
        .enabled(config.msvc.enabled && !args.no_detect)
        .maybe_vswhere(
            args.vswhere
                .clone()
                .or_else(|| config.msvc.vswhere.clone()),
        )
        .query(config.msvc.query())
        .arch(args.arch.unwrap_or(config.msvc.arch))
        .build()
}

/// Runs detection and then the configured build command.
///
/// # Errors
///
/// Returns an error if the build command cannot be found, fails, or is
/// interrupted. Detection problems only produce warnings.
pub async fn run_generate_command(args: &GenerateArgs, config: &Config) -> Result<()> {
    let cancel_token = CancellationToken::new();
    let signal_token = cancel_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Received Ctrl+C, stopping build...");
            signal_token.cancel();
        }
    });

    let delegate = config
        .delegate
        .platform()
        .with_extra_args(args.extra.clone())
        .with_cancellation(cancel_token.clone());
    let patcher = MsvcPatcher::new(delegate, msvc_options(config, &args.detect));

    let mut env = BuildEnv::current();
    let detection = patch_until_cancelled(&patcher, &mut env, &cancel_token).await?;
    patcher.inner().generate(&mut env).await?;
    info!(detection = %detection, "build completed successfully");
    Ok(())
}

/// Runs detection unless `token` fires first.
///
/// Dropping the pending detection kills any vswhere or vcvarsall child.
///
/// # Errors
///
/// Returns [`ProcessError::Interrupted`] when cancelled.
pub async fn patch_until_cancelled<P, T>(
    patcher: &MsvcPatcher<P, T>,
    env: &mut BuildEnv,
    token: &CancellationToken,
) -> Result<Detection>
where
    P: PlatformModule,
    T: ToolchainProbe,
{
    tokio::select! {
        biased;
        () = token.cancelled() => Err(ProcessError::Interrupted {
            command: "msvc detection".to_string(),
        }
        .into()),
        detection = patcher.patch(env) => Ok(detection),
    }
}

/// Runs detection and prints the resulting settings.
///
/// # Errors
///
/// Returns an error if the settings cannot be serialized.
pub async fn run_env_command(args: &EnvArgs, config: &Config) -> Result<()> {
    let patcher = MsvcPatcher::new(config.delegate.platform(), msvc_options(config, &args.detect));

    let mut env = BuildEnv::current();
    let detection = patcher.patch(&mut env).await;
    info!(detection = %detection, "MSVC detection");

    print!("{}", format_settings(&env, args.json)?);
    Ok(())
}

/// Renders build settings as `KEY=VALUE` lines or a JSON object.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_settings(env: &BuildEnv, json: bool) -> Result<String> {
    use std::fmt::Write as _;

    if json {
        let mut out = serde_json::to_string_pretty(env.settings_map())?;
        out.push('\n');
        return Ok(out);
    }

    let mut out = String::new();
    for (key, value) in env.settings() {
        let _ = writeln!(out, "{key}={value}");
    }
    Ok(out)
}
