// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Generate | Env | Locate | List | Exists | Options | Config
//! ```

use std::process::ExitCode;

use msvc_fix::cli::global::GlobalOptions;
use msvc_fix::cli::{self, Command};
use msvc_fix::cmd::config::run_config_command;
use msvc_fix::cmd::generate::{run_env_command, run_generate_command};
use msvc_fix::cmd::platform::{run_exists_command, run_options_command};
use msvc_fix::cmd::vs::{run_list_command, run_locate_command};
use msvc_fix::config::loader::ConfigLoader;
use msvc_fix::config::{Config, DEFAULT_CONFIG_FILE, ENV_PREFIX};
use msvc_fix::logging::{LogConfig, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    if matches!(cli.command, Some(Command::Version)) {
        handle_version_command();
        return ExitCode::SUCCESS;
    }

    let (config, config_files) = match load_config(&cli.global) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = build_log_config(&config);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, &config, &config_files).await
}

fn build_log_config(config: &Config) -> LogConfig {
    LogConfig::builder()
        .with_console_level(config.global.output_log_level)
        .with_file_level(config.global.file_log_level)
        .maybe_with_log_file(
            config
                .global
                .log_file
                .as_ref()
                .map(|p| p.display().to_string()),
        )
        .with_file_format(config.global.log_format)
        .build()
}

async fn dispatch_command(cli: &cli::Cli, config: &Config, config_files: &[String]) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Generate(args)) => run_generate_command(args, config).await,
        Some(Command::Env(args)) => run_env_command(args, config).await,
        Some(Command::Locate) => run_locate_command(config).await,
        Some(Command::List(args)) => run_list_command(args, config).await,
        Some(Command::Exists) => run_exists_command(config),
        Some(Command::Options) => {
            run_options_command(config);
            Ok(())
        }
        Some(Command::Config) => {
            run_config_command(config, config_files);
            Ok(())
        }
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> ConfigLoader {
    let mut loader = ConfigLoader::new();
    if !global.no_default_config {
        loader = loader.add_toml_file_optional(DEFAULT_CONFIG_FILE);
    }
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader.with_env_prefix(ENV_PREFIX)
}

fn load_config(global: &GlobalOptions) -> msvc_fix::error::Result<(Config, Vec<String>)> {
    let loader = build_config_loader(global).apply_overrides(global.to_config_overrides())?;
    let files = loader.format_loaded_files();
    Ok((loader.build()?, files))
}
