//! Process-wide configuration: ports, log paths, and startup experiments.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::logger::LogFormat;

const PRODUCT_NAME: &str = "supersurf";
const DEFAULT_PORT: u16 = 5555;

/// Configuration assembled once at startup from CLI flags and environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Loopback port the extension bridge listens on.
    pub port: u16,
    /// Whether `--debug` was passed, and in which truncation mode.
    pub debug: bool,
    /// Truncation policy for both loggers.
    pub log_format: LogFormat,
    /// Explicit `--log-file` override; falls back to `<home>/.supersurf/logs`.
    pub log_dir: PathBuf,
    /// Experiment names enabled via `SUPERSURF_EXPERIMENTS`.
    pub experiments: HashSet<String>,
    /// Crate version surfaced in the status header.
    pub version: &'static str,
}

impl ServerConfig {
    /// Build configuration for production use: resolves the log directory
    /// against `$HOME` and parses `SUPERSURF_EXPERIMENTS` from the process
    /// environment.
    #[must_use]
    pub fn new(port: Option<u16>, debug: bool, log_format: LogFormat, log_file: Option<PathBuf>) -> Self {
        let log_dir = log_file.unwrap_or_else(default_log_dir);
        Self {
            port: port.unwrap_or(DEFAULT_PORT),
            debug,
            log_format,
            log_dir,
            experiments: parse_experiments(std::env::var("SUPERSURF_EXPERIMENTS").ok().as_deref()),
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Whether a named experiment is enabled.
    #[must_use]
    pub fn experiment(&self, name: &str) -> bool {
        self.experiments.contains(name)
    }
}

fn default_log_dir() -> PathBuf {
    let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(format!(".{PRODUCT_NAME}")).join("logs")
}

pub(crate) fn parse_experiments(raw: Option<&str>) -> HashSet<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Resolve an agent-supplied path against `$HOME`, rejecting any result that
/// escapes it. Absolute agent paths are reinterpreted as relative (spec 6).
pub fn sandbox_path(home: &std::path::Path, agent_path: &str) -> Result<PathBuf, SandboxError> {
    let relative = agent_path.trim_start_matches('/');
    let candidate = home.join(relative);
    let normalized = normalize(&candidate);
    let home_normalized = normalize(home);
    if normalized.starts_with(&home_normalized) {
        Ok(normalized)
    } else {
        Err(SandboxError::Escaped)
    }
}

fn normalize(path: &std::path::Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Error for a path that resolves outside `$HOME`.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// Resolution escaped the sandbox root.
    #[error("Permission denied")]
    Escaped,
}
