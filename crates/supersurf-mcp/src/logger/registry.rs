//! Per-session and server-wide file loggers.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::format::{format_line, render_payload, LogFormat};
use serde_json::Value;

/// A single append-target: truncated on open, every write flushed.
pub struct Logger {
    file: Mutex<File>,
    format: LogFormat,
}

impl Logger {
    fn open(path: &Path, format: LogFormat) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
            format,
        })
    }

    /// Write one payload as a line, flushing immediately so a crash still
    /// leaves a diagnosable trail.
    pub fn log(&self, payload: &Value) {
        let rendered = render_payload(payload, self.format);
        let line = format_line(chrono::Utc::now(), &rendered);
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
            let _ = file.flush();
        }
    }

    /// Convenience for plain string messages.
    pub fn log_str(&self, message: &str) {
        self.log(&Value::String(message.to_string()));
    }
}

/// Owns the always-on server logger plus zero-or-more session loggers keyed
/// by client id. Created once and handed to the pieces that need it rather
/// than reached for as a global.
pub struct LogRegistry {
    log_dir: PathBuf,
    format: LogFormat,
    server: Logger,
    sessions: Mutex<HashMap<String, std::sync::Arc<Logger>>>,
}

impl LogRegistry {
    /// Open the server log at `<log_dir>/server.log`, creating `log_dir` and
    /// its `sessions/` child directory if needed.
    pub fn new(log_dir: PathBuf, format: LogFormat) -> std::io::Result<Self> {
        let server = Logger::open(&log_dir.join("server.log"), format)?;
        Ok(Self {
            log_dir,
            format,
            server,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Server-wide logger, always available.
    #[must_use]
    pub fn server(&self) -> &Logger {
        &self.server
    }

    /// Returns the session logger for `client_id`, opening it on first use.
    /// Falls back to the server logger if the session log can't be opened.
    pub fn session(&self, client_id: &str) -> std::sync::Arc<Logger> {
        if let Some(existing) = self.sessions.lock().unwrap().get(client_id) {
            return existing.clone();
        }
        let path = self.log_dir.join("sessions").join(format!("{client_id}.log"));
        let logger = std::sync::Arc::new(match Logger::open(&path, self.format) {
            Ok(l) => l,
            Err(_) => Logger::open(&self.log_dir.join("server.log"), self.format)
                .expect("server log already open"),
        });
        self.sessions
            .lock()
            .unwrap()
            .insert(client_id.to_string(), logger.clone());
        logger
    }

    /// Returns the session logger if `session_id` is present, else the
    /// server logger — mirrors `getLogger(sessionId?)`.
    pub fn get(&self, session_id: Option<&str>) -> std::sync::Arc<Logger> {
        match session_id {
            Some(id) => self.session(id),
            None => std::sync::Arc::new(Logger {
                file: Mutex::new(
                    OpenOptions::new()
                        .append(true)
                        .open(self.log_dir.join("server.log"))
                        .expect("server log exists"),
                ),
                format: self.format,
            }),
        }
    }
}
