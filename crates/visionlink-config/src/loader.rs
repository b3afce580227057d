// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! `visionlink.toml` discovery and layered overrides
//!
//! File values are overridden by `VISIONLINK_*` variables, which are overridden by explicit
//! CLI `key = value` pairs.

use crate::{validate_config, ConfigError, ConfigResult, VisionLinkConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "visionlink.toml";

/// Find the visionlink configuration file
///
/// Search order:
/// 1. `VISIONLINK_CONFIG_PATH` environment variable
/// 2. Current working directory: `./visionlink.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("VISIONLINK_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by VISIONLINK_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd;
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent.to_path_buf();
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|path| path.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\n\
         Set VISIONLINK_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Read `config_path` (or the discovered `visionlink.toml`), then layer environment and
/// `cli_args` overrides on top and validate the result
///
/// Missing keys fall back to defaults. A missing file is an error; callers that want to run
/// without one should start from `VisionLinkConfig::default()`.
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<VisionLinkConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file).map_err(|source| ConfigError::Read {
        path: config_file.clone(),
        source,
    })?;
    let mut config: VisionLinkConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_file.clone(),
            message: e.to_string(),
        })?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    validate_config(&config)?;
    Ok(config)
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `VISIONLINK_IDLE_PIPELINE` -> `pipelines.idle`
/// - `VISIONLINK_RECOGNITION_PIPELINE` -> `pipelines.recognition`
/// - `VISIONLINK_INIT_TIMEOUT_MS` -> `timing.init_timeout_ms`
/// - `VISIONLINK_RECOGNITION_TIMEOUT_MS` -> `timing.recognition_timeout_ms`
/// - `VISIONLINK_SETTLE_DELAY_MS` -> `timing.settle_delay_ms`
/// - `VISIONLINK_CAPTURE_ON_CRASH` -> `snapshots.capture_on_crash`
/// - `VISIONLINK_LOG_LEVEL` -> `logging.level`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut VisionLinkConfig) {
    if let Some(index) = env_parsed::<u32>("VISIONLINK_IDLE_PIPELINE") {
        config.pipelines.idle = index;
    }
    if let Some(index) = env_parsed::<u32>("VISIONLINK_RECOGNITION_PIPELINE") {
        config.pipelines.recognition = index;
    }
    if let Some(ms) = env_parsed::<u64>("VISIONLINK_INIT_TIMEOUT_MS") {
        config.timing.init_timeout_ms = ms;
    }
    if let Some(ms) = env_parsed::<u64>("VISIONLINK_RECOGNITION_TIMEOUT_MS") {
        config.timing.recognition_timeout_ms = ms;
    }
    if let Some(ms) = env_parsed::<u64>("VISIONLINK_SETTLE_DELAY_MS") {
        config.timing.settle_delay_ms = ms;
    }
    if let Ok(value) = env::var("VISIONLINK_CAPTURE_ON_CRASH") {
        config.snapshots.capture_on_crash = parse_flag(&value);
    }
    if let Ok(value) = env::var("VISIONLINK_LOG_LEVEL") {
        config.logging.level = value;
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.parse::<T>().ok())
}

/// Apply `key = value` overrides from the command line
///
/// Keys: `idle_pipeline`, `recognition_pipeline`, `init_timeout_ms`, `recognition_timeout_ms`,
/// `settle_delay_ms`, `capture_on_crash`, `log_level`. Unparseable values are ignored.
pub fn apply_cli_overrides(config: &mut VisionLinkConfig, cli_args: &HashMap<String, String>) {
    if let Some(index) = cli_parsed::<u32>(cli_args, "idle_pipeline") {
        config.pipelines.idle = index;
    }
    if let Some(index) = cli_parsed::<u32>(cli_args, "recognition_pipeline") {
        config.pipelines.recognition = index;
    }
    if let Some(ms) = cli_parsed::<u64>(cli_args, "init_timeout_ms") {
        config.timing.init_timeout_ms = ms;
    }
    if let Some(ms) = cli_parsed::<u64>(cli_args, "recognition_timeout_ms") {
        config.timing.recognition_timeout_ms = ms;
    }
    if let Some(ms) = cli_parsed::<u64>(cli_args, "settle_delay_ms") {
        config.timing.settle_delay_ms = ms;
    }
    if let Some(value) = cli_args.get("capture_on_crash") {
        config.snapshots.capture_on_crash = parse_flag(value);
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}

fn cli_parsed<T: std::str::FromStr>(cli_args: &HashMap<String, String>, key: &str) -> Option<T> {
    cli_args.get(key).and_then(|value| value.trim().parse::<T>().ok())
}
