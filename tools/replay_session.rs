// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Offline recognition replay.
//!
//! Runs a recorded JSON device script through the handshake and one recognition session,
//! then prints the outcome as JSON. Exit code 0 on a successful recognition, 1 on any
//! other outcome, 2 on usage or setup errors.

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use visionlink::config::{
    apply_environment_overrides, find_config_file, load_config, validate_config, VisionLinkConfig,
};
use visionlink::observability::{
    debug_flags_help, init_console_logging, parse_debug_flags, CrateDebugFlags, LogFormat,
};
use visionlink::recognition::{AllianceSelector, RecognitionSettings};
use visionlink::replay::{load_script, replay_script, ReplayOptions, DEFAULT_POLL_LATENCY_US};

struct Args {
    script: PathBuf,
    config: Option<PathBuf>,
    alliance: AllianceSelector,
    poll_latency_us: u64,
    json_logs: bool,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: replay_session --script <path> [--alliance NONE|BLUE|RED] [--config <path>]\n\
         \x20                     [--poll-latency-us <n>] [--json-logs]\n\
         \x20                     [--debug-<crate>|--trace-<crate>]\n\n\
         Defaults:\n\
         - alliance: RED\n\
         - config: visionlink.toml if found, built-in defaults otherwise\n\
         - poll-latency-us: {}\n\n{}",
        DEFAULT_POLL_LATENCY_US,
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> Args {
    let mut script = None;
    let mut config = None;
    let mut alliance = AllianceSelector::Red;
    let mut poll_latency_us = DEFAULT_POLL_LATENCY_US;
    let mut json_logs = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--script" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                script = Some(PathBuf::from(v));
            }
            "--config" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                config = Some(PathBuf::from(v));
            }
            "--alliance" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                alliance = v.parse().unwrap_or_else(|e: String| {
                    eprintln!("{e}");
                    usage_and_exit()
                });
            }
            "--poll-latency-us" => {
                let v = args.next().unwrap_or_else(|| usage_and_exit());
                poll_latency_us = v.parse().unwrap_or_else(|_| {
                    eprintln!("Invalid --poll-latency-us value: {v}");
                    usage_and_exit()
                });
            }
            "--json-logs" => json_logs = true,
            "-h" | "--help" => usage_and_exit(),
            // Consumed by parse_debug_flags
            other if other.starts_with("--debug-") || other.starts_with("--trace-") => {}
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        }
    }

    let Some(script) = script else {
        eprintln!("--script is required");
        usage_and_exit();
    };
    Args {
        script,
        config,
        alliance,
        poll_latency_us,
        json_logs,
    }
}

fn resolve_config(explicit: Option<&Path>) -> Result<VisionLinkConfig> {
    if let Some(path) = explicit {
        return load_config(Some(path), None)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    if let Ok(path) = find_config_file() {
        return load_config(Some(path.as_path()), None)
            .with_context(|| format!("Failed to load config {}", path.display()));
    }
    let mut config = VisionLinkConfig::default();
    apply_environment_overrides(&mut config);
    validate_config(&config).context("Invalid environment overrides")?;
    Ok(config)
}

#[cfg(feature = "file-logging")]
type LogGuard = Option<visionlink::observability::LoggingGuard>;
#[cfg(not(feature = "file-logging"))]
type LogGuard = ();

#[cfg(feature = "file-logging")]
fn init_tracing(
    config: &VisionLinkConfig,
    flags: &CrateDebugFlags,
    format: LogFormat,
) -> Result<LogGuard> {
    use visionlink::observability::{init_logging, LoggingOptions};

    if !config.logging.file_logging {
        init_console_logging(flags, format)?;
        return Ok(None);
    }
    let mut options = LoggingOptions {
        format,
        ..LoggingOptions::default()
    };
    if let Some(dir) = &config.logging.log_dir {
        options.log_dir = dir.clone();
    }
    init_logging(flags, &options).map(Some)
}

#[cfg(not(feature = "file-logging"))]
fn init_tracing(
    config: &VisionLinkConfig,
    flags: &CrateDebugFlags,
    format: LogFormat,
) -> Result<LogGuard> {
    if config.logging.file_logging {
        eprintln!(
            "replay_session: built without the file-logging feature, logging to console only"
        );
    }
    init_console_logging(flags, format)
}

fn run(args: Args) -> Result<bool> {
    let config = resolve_config(args.config.as_deref())?;

    let format = if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    let debug_flags = parse_debug_flags().with_default_level(&config.logging.level);
    let _log_guard = init_tracing(&config, &debug_flags, format)?;
    for name in debug_flags.unknown_crates() {
        tracing::warn!("Ignoring debug flag for unknown crate '{}'", name);
    }

    let script = load_script(&args.script)?;
    let options = ReplayOptions {
        alliance: args.alliance,
        settings: RecognitionSettings::from_config(&config),
        poll_latency_us: args.poll_latency_us,
    };
    let outcome = replay_script(script, &options)?;

    let report = serde_json::json!({
        "script": args.script.display().to_string(),
        "outcome": serde_json::to_value(&outcome)?,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(outcome.succeeded())
}

fn main() {
    match run(parse_args()) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("replay_session: {e:#}");
            process::exit(2);
        }
    }
}
