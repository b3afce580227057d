//! Configuration validation
//!
//! This module provides validation logic to ensure configuration values are
//! consistent, within valid ranges, and don't conflict with each other.

use crate::{ConfigError, ConfigResult, VisionLinkConfig};

/// Longest accepted polling budget
pub const MAX_TIMEOUT_MS: u64 = 60_000;
/// Longest accepted settle delay
pub const MAX_SETTLE_DELAY_MS: u64 = 10_000;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    PipelineConflict { pipeline: u32 },
    OutOfRange { field: String, value: u64, min: u64, max: u64 },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PipelineConflict { pipeline } => {
                write!(
                    f,
                    "Pipeline conflict: pipelines.idle and pipelines.recognition \
                     both use pipeline {}",
                    pipeline
                )
            }
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "{} = {} is outside valid range ({}-{})",
                    field, value, min, max
                )
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Distinct idle and recognition pipelines
/// - Timing budgets within range
/// - Known log level
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` with details if validation fails
pub fn validate_config(config: &VisionLinkConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_pipelines(config, &mut errors);
    validate_timing(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_pipelines(config: &VisionLinkConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.pipelines.idle == config.pipelines.recognition {
        errors.push(ConfigValidationError::PipelineConflict {
            pipeline: config.pipelines.idle,
        });
    }
}

fn validate_timing(config: &VisionLinkConfig, errors: &mut Vec<ConfigValidationError>) {
    let budgets = [
        ("timing.init_timeout_ms", config.timing.init_timeout_ms),
        (
            "timing.recognition_timeout_ms",
            config.timing.recognition_timeout_ms,
        ),
    ];
    for (field, value) in budgets {
        if value == 0 || value > MAX_TIMEOUT_MS {
            errors.push(ConfigValidationError::OutOfRange {
                field: field.to_string(),
                value,
                min: 1,
                max: MAX_TIMEOUT_MS,
            });
        }
    }

    if config.timing.settle_delay_ms > MAX_SETTLE_DELAY_MS {
        errors.push(ConfigValidationError::OutOfRange {
            field: "timing.settle_delay_ms".to_string(),
            value: config.timing.settle_delay_ms,
            min: 0,
            max: MAX_SETTLE_DELAY_MS,
        });
    }
}

fn validate_logging(config: &VisionLinkConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }
}
