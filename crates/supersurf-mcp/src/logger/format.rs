//! Log line formatting: timestamping, truncation, and base64 redaction.

use serde_json::Value;

/// How much of a long payload to keep in a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Abbreviate strings over 120 chars and objects over ~480 chars.
    #[default]
    Truncate,
    /// Write payloads in full.
    NoTruncate,
}

impl LogFormat {
    /// Parse from the CLI's `--debug[=no_truncate]` value.
    #[must_use]
    pub fn from_debug_flag(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("no_truncate") => Self::NoTruncate,
            _ => Self::Truncate,
        }
    }
}

const STRING_TRUNCATE_LEN: usize = 120;
const OBJECT_TRUNCATE_LEN: usize = 480;
const BASE64_MIN_LEN: usize = 200;

/// Render a single log line as `[ISO-8601] <payload>`.
#[must_use]
pub fn format_line(timestamp: chrono::DateTime<chrono::Utc>, payload: &str) -> String {
    format!("[{}] {payload}\n", timestamp.to_rfc3339())
}

/// Render an arbitrary payload (string or structured value) according to
/// the given truncation policy, redacting likely base64 blobs first.
#[must_use]
pub fn render_payload(payload: &Value, format: LogFormat) -> String {
    match payload {
        Value::String(s) => {
            let redacted = redact_base64(s);
            match format {
                LogFormat::NoTruncate => redacted,
                LogFormat::Truncate => truncate_string(&redacted, STRING_TRUNCATE_LEN),
            }
        }
        other => {
            let serialized = serde_json::to_string(other).unwrap_or_else(|_| other.to_string());
            let redacted = redact_base64(&serialized);
            match format {
                LogFormat::NoTruncate => redacted,
                LogFormat::Truncate => truncate_string(&redacted, OBJECT_TRUNCATE_LEN),
            }
        }
    }
}

/// Abbreviate a string longer than `max_len` as `head…tail`.
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let half = max_len / 2;
    let head: String = s.chars().take(half).collect();
    let tail: String = s
        .chars()
        .rev()
        .take(max_len - half)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{head}…{tail}")
}

/// Replace runs of likely base64 data (length > 200, alphabet restricted to
/// `[A-Za-z0-9+/=]`) with a `[base64 N chars]` marker.
#[must_use]
pub fn redact_base64(s: &str) -> String {
    let is_b64_char = |c: char| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=';

    let mut out = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if is_b64_char(chars[i]) {
            let start = i;
            while i < chars.len() && is_b64_char(chars[i]) {
                i += 1;
            }
            let run_len = i - start;
            if run_len > BASE64_MIN_LEN {
                out.push_str(&format!("[base64 {run_len} chars]"));
            } else {
                out.extend(&chars[start..i]);
            }
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}
