//! `browser_download` (spec 4.F.10).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

use crate::config::sandbox_path;
use crate::connection::{BrokerContext, BrokerError};

use super::traits::{Tool, ToolOutcome};

/// `browser_download {url, filename?, destination?}`: asks the extension
/// to fetch the resource (so cookies/session state apply) and, when a
/// `destination` is given, writes it under `$HOME` — renaming across the
/// same filesystem, or copying then unlinking the source on cross-device
/// moves (`EXDEV`).
pub struct BrowserDownload;

#[async_trait]
impl Tool for BrowserDownload {
    fn name(&self) -> &'static str {
        "browser_download"
    }

    fn description(&self) -> &'static str {
        "Download a URL through the browser's session and optionally save it under $HOME."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string" },
                "filename": { "type": "string" },
                "destination": { "type": "string" },
            },
            "required": ["url"],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let url = args
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| BrokerError::InvalidArguments("missing `url`".to_string()))?;
        let filename = args.get("filename").and_then(Value::as_str);

        let params = json!({ "url": url, "filename": filename });
        let result = ctx
            .send_cmd("download", Some(params), Some(std::time::Duration::from_secs(300)))
            .await?;

        let tmp_path = result
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| BrokerError::PeerError("download response missing `path`".to_string()))?;

        let Some(destination) = args.get("destination").and_then(Value::as_str) else {
            return Ok(ToolOutcome::json(result));
        };

        let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
        let resolved = sandbox_path(&home, destination).map_err(|_| BrokerError::Sandbox)?;
        let resolved = resolve_destination_name(&resolved, tmp_path, result.get("filename").and_then(Value::as_str));

        if let Some(parent) = resolved.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BrokerError::ScriptError(e.to_string()))?;
        }
        move_file(Path::new(tmp_path), &resolved)?;

        Ok(ToolOutcome::json(json!({ "path": resolved })))
    }
}

/// If `destination` names a directory (trailing separator, or an existing
/// directory), append the downloaded file's own name to it.
pub(crate) fn resolve_destination_name(destination: &Path, tmp_path: &str, downloaded_name: Option<&str>) -> PathBuf {
    let looks_like_dir = destination.to_string_lossy().ends_with('/')
        || destination.is_dir()
        || destination.extension().is_none() && downloaded_name.is_some();
    if looks_like_dir {
        let name = downloaded_name
            .map(str::to_string)
            .unwrap_or_else(|| Path::new(tmp_path).file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default());
        destination.join(name)
    } else {
        destination.to_path_buf()
    }
}

fn move_file(from: &Path, to: &Path) -> Result<(), BrokerError> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(libc_exdev()) => {
            std::fs::copy(from, to).map_err(|e| BrokerError::ScriptError(e.to_string()))?;
            std::fs::remove_file(from).ok();
            Ok(())
        }
        Err(e) => Err(BrokerError::ScriptError(e.to_string())),
    }
}

/// `EXDEV` errno — cross-device rename. Named rather than importing the
/// `libc` crate solely for this one constant.
const fn libc_exdev() -> i32 {
    18
}
