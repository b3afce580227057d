//! Per-crate verbosity flags
//!
//! `--debug-<crate>` raises one crate to debug, `--trace-<crate>` to trace (every poll
//! cycle), and `--debug-all` / `--trace-all` cover all of [`KNOWN_CRATES`]. The same
//! names are accepted from `VISIONLINK_DEBUG`.

use std::collections::BTreeMap;
use std::env;

use tracing::Level;

use crate::KNOWN_CRATES;

const DEBUG_PREFIX: &str = "--debug-";
const TRACE_PREFIX: &str = "--trace-";
const ALL_CRATES: &str = "all";

/// Crates raised above the default level
///
/// # Example
/// ```rust
/// use visionlink_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--trace-visionlink-recognition".to_string()]);
/// assert_eq!(flags.to_filter_string(), "visionlink_recognition=trace,info");
/// ```
#[derive(Debug, Clone)]
pub struct CrateDebugFlags {
    levels: BTreeMap<String, Level>,
    unknown: Vec<String>,
    default_level: String,
}

impl Default for CrateDebugFlags {
    fn default() -> Self {
        Self {
            levels: BTreeMap::new(),
            unknown: Vec::new(),
            default_level: "info".to_string(),
        }
    }
}

impl CrateDebugFlags {
    /// Collect `--debug-*` and `--trace-*` flags; every other argument is ignored
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if let Some(name) = arg.strip_prefix(TRACE_PREFIX) {
                flags.raise(name, Level::TRACE);
            } else if let Some(name) = arg.strip_prefix(DEBUG_PREFIX) {
                flags.raise(name, Level::DEBUG);
            }
        }
        flags
    }

    /// Replace the level used for crates without a flag
    pub fn with_default_level(mut self, level: &str) -> Self {
        self.default_level = level.to_lowercase();
        self
    }

    fn raise(&mut self, crate_name: &str, level: Level) {
        if crate_name == ALL_CRATES {
            for known in KNOWN_CRATES {
                self.set(known, level);
            }
        } else if KNOWN_CRATES.contains(&crate_name) {
            self.set(crate_name, level);
        } else if !self.unknown.iter().any(|name| name == crate_name) {
            self.unknown.push(crate_name.to_string());
        }
    }

    // Never lowers a crate already raised further
    fn set(&mut self, crate_name: &str, level: Level) {
        let current = self.levels.entry(crate_name.to_string()).or_insert(level);
        if level > *current {
            *current = level;
        }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.levels.contains_key(crate_name)
    }

    /// Raised crates, sorted by name
    pub fn enabled_crates(&self) -> Vec<&str> {
        self.levels.keys().map(String::as_str).collect()
    }

    pub fn any_enabled(&self) -> bool {
        !self.levels.is_empty()
    }

    /// Flag names that matched no known crate, for the caller to report
    pub fn unknown_crates(&self) -> &[String] {
        &self.unknown
    }

    /// Level for a crate: its flag level, or INFO
    pub fn log_level(&self, crate_name: &str) -> Level {
        self.levels.get(crate_name).copied().unwrap_or(Level::INFO)
    }

    /// `EnvFilter` directive string
    ///
    /// Tracing targets are module paths, so crate names are written with underscores:
    /// "visionlink_hal=debug,visionlink_recognition=trace,info".
    pub fn to_filter_string(&self) -> String {
        let mut directives: Vec<String> = self
            .levels
            .iter()
            .map(|(crate_name, level)| {
                format!(
                    "{}={}",
                    crate_name.replace('-', "_"),
                    level.as_str().to_ascii_lowercase()
                )
            })
            .collect();
        directives.push(self.default_level.clone());
        directives.join(",")
    }
}

/// Flags from the process arguments plus `VISIONLINK_DEBUG`
///
/// `VISIONLINK_DEBUG` is a comma-separated list of crate names, each optionally suffixed
/// with `=trace`, e.g. "visionlink-recognition=trace,visionlink-hal". `all` is accepted.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(value) = env::var("VISIONLINK_DEBUG") {
        apply_debug_env(&mut flags, &value);
    }
    flags
}

fn apply_debug_env(flags: &mut CrateDebugFlags, value: &str) {
    for entry in value.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        match entry.split_once('=') {
            Some((crate_name, level)) if level.trim().eq_ignore_ascii_case("trace") => {
                flags.raise(crate_name.trim(), Level::TRACE)
            }
            Some((crate_name, _)) => flags.raise(crate_name.trim(), Level::DEBUG),
            None => flags.raise(entry, Level::DEBUG),
        }
    }
}

pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Debug logging for all crates
  --trace-all                    Per-poll trace logging for all crates
  --debug-{{crate-name}}          Debug logging for one crate
  --trace-{{crate-name}}          Trace logging for one crate

Available crates:
  {}

Environment Variable:
  VISIONLINK_DEBUG={{crate-name}}[=trace][,...]  Raise crates (comma-separated)
  VISIONLINK_DEBUG=all                          Debug for all crates
"#,
        KNOWN_CRATES.join(", ")
    )
}
