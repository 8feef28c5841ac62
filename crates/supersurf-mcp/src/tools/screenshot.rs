//! `browser_take_screenshot` and `browser_pdf_save` (spec 4.F.5).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::imageops::FilterType;
use serde_json::{json, Value};

use crate::config::sandbox_path;
use crate::connection::{BrokerContext, BrokerError};
use crate::primitives::eval::{highlight_clickables, restore_highlight};

use super::traits::{ContentBlock, Tool, ToolOutcome};

/// Inline screenshots are downscaled to fit this bound on the long edge
/// while preserving aspect ratio (spec 4.F.5, B1: exactly 2000 is kept).
const SCREENSHOT_MAX_DIMENSION: u32 = 2000;

/// Request the extension's screenshot and decode/resize/re-encode it per
/// spec 4.F.5. Shared by `browser_take_screenshot` and the dispatcher's
/// inline-screenshot composition for the interact/navigate/etc. set.
pub(crate) async fn capture(
    ctx: &BrokerContext,
    image_type: &str,
    quality: u8,
    full_page: bool,
    clip: Option<Value>,
) -> Result<Vec<u8>, BrokerError> {
    let mut params = json!({ "type": image_type, "quality": quality, "fullPage": full_page });
    if let Some(clip) = clip {
        params["clip"] = clip;
    }
    let response = ctx.send_cmd("screenshot", Some(params), Some(std::time::Duration::from_secs(60))).await?;
    let base64_data = response
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| BrokerError::PeerError("screenshot response missing `data`".to_string()))?;
    BASE64
        .decode(base64_data)
        .map_err(|e| BrokerError::PeerError(format!("invalid base64 screenshot data: {e}")))
}

/// Downscale to fit `SCREENSHOT_MAX_DIMENSION` on the longer edge if
/// either dimension exceeds it; otherwise return the bytes untouched.
fn resize_if_needed(bytes: &[u8], image_type: &str, quality: u8) -> Result<Vec<u8>, BrokerError> {
    let img = image::load_from_memory(bytes).map_err(|e| BrokerError::ScriptError(format!("invalid image data: {e}")))?;
    let (w, h) = (img.width(), img.height());
    if w <= SCREENSHOT_MAX_DIMENSION && h <= SCREENSHOT_MAX_DIMENSION {
        return Ok(bytes.to_vec());
    }
    let scaled = img.resize(SCREENSHOT_MAX_DIMENSION, SCREENSHOT_MAX_DIMENSION, FilterType::Lanczos3);
    encode(&scaled, image_type, quality)
}

fn encode(img: &image::DynamicImage, image_type: &str, quality: u8) -> Result<Vec<u8>, BrokerError> {
    let mut buf = std::io::Cursor::new(Vec::new());
    let format = match image_type {
        "jpeg" => {
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
            img.write_with_encoder(encoder)
                .map_err(|e| BrokerError::ScriptError(format!("jpeg encode failed: {e}")))?;
            return Ok(buf.into_inner());
        }
        _ => image::ImageFormat::Png,
    };
    img.write_to(&mut buf, format)
        .map_err(|e| BrokerError::ScriptError(format!("image encode failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Capture the current viewport at default settings for the inline
/// screenshot composition step. Writes nothing to disk.
pub(crate) async fn capture_viewport_block(ctx: &BrokerContext) -> Result<ContentBlock, BrokerError> {
    let raw = capture(ctx, "png", 80, false, None).await?;
    let resized = resize_if_needed(&raw, "png", 80)?;
    Ok(ContentBlock::Image {
        data: BASE64.encode(resized),
        mime_type: "image/png".to_string(),
    })
}

/// `browser_take_screenshot {type, quality, fullPage, path?, highlightClickables?, clip_x/y/width/height?, selector?}`.
pub struct BrowserTakeScreenshot;

#[async_trait]
impl Tool for BrowserTakeScreenshot {
    fn name(&self) -> &'static str {
        "browser_take_screenshot"
    }

    fn description(&self) -> &'static str {
        "Capture a PNG or JPEG screenshot of the page or viewport."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "type": { "type": "string", "enum": ["png", "jpeg"] },
                "quality": { "type": "integer" },
                "fullPage": { "type": "boolean" },
                "path": { "type": "string" },
                "highlightClickables": { "type": "boolean" },
                "clip_x": { "type": "integer" },
                "clip_y": { "type": "integer" },
                "clip_width": { "type": "integer" },
                "clip_height": { "type": "integer" },
                "selector": { "type": "string" },
            },
            "required": [],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let image_type = args.get("type").and_then(Value::as_str).unwrap_or("png");
        let quality = args.get("quality").and_then(Value::as_u64).unwrap_or(80) as u8;
        let full_page = args.get("fullPage").and_then(Value::as_bool).unwrap_or(false);
        let highlight = args.get("highlightClickables").and_then(Value::as_bool).unwrap_or(false);

        let clip = clip_from_args(&args);

        if highlight {
            highlight_clickables(ctx).await?;
        }
        let raw = capture(ctx, image_type, quality, full_page, clip).await?;
        if highlight {
            restore_highlight(ctx).await;
        }

        let path = args.get("path").and_then(Value::as_str);
        if let Some(path) = path {
            let home = std::env::var_os("HOME").map_or_else(|| std::path::PathBuf::from("."), std::path::PathBuf::from);
            let resolved = sandbox_path(&home, path).map_err(|_| BrokerError::Sandbox)?;
            if let Some(parent) = resolved.parent() {
                std::fs::create_dir_all(parent).map_err(|e| BrokerError::ScriptError(e.to_string()))?;
            }
            std::fs::write(&resolved, &raw).map_err(|e| BrokerError::ScriptError(e.to_string()))?;
            return Ok(ToolOutcome::json(json!({ "path": resolved, "bytes": raw.len() })));
        }

        let resized = resize_if_needed(&raw, image_type, quality)?;
        let mime_type = if image_type == "jpeg" { "image/jpeg" } else { "image/png" };
        Ok(ToolOutcome {
            content: vec![ContentBlock::Image { data: BASE64.encode(&resized), mime_type: mime_type.to_string() }],
            raw: json!({ "bytes": resized.len() }),
            pre_captured_screenshot: None,
        })
    }
}

pub(crate) fn clip_from_args(args: &Value) -> Option<Value> {
    let x = args.get("clip_x")?.as_i64()?;
    let y = args.get("clip_y")?.as_i64()?;
    let width = args.get("clip_width")?.as_i64()?;
    let height = args.get("clip_height")?.as_i64()?;
    Some(json!({ "x": x, "y": y, "width": width, "height": height, "scale": 1 }))
}

/// `browser_pdf_save {path?}`.
pub struct BrowserPdfSave;

#[async_trait]
impl Tool for BrowserPdfSave {
    fn name(&self) -> &'static str {
        "browser_pdf_save"
    }

    fn description(&self) -> &'static str {
        "Print the current page to PDF and save it to disk."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": { "path": { "type": "string" } }, "required": [] })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let response = ctx.cdp("Page.printToPDF", json!({})).await?;
        let base64_data = response
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| BrokerError::PeerError("Page.printToPDF returned no data".to_string()))?;
        let bytes = BASE64
            .decode(base64_data)
            .map_err(|e| BrokerError::PeerError(format!("invalid base64 PDF data: {e}")))?;

        let path = args.get("path").and_then(Value::as_str).unwrap_or("page.pdf");
        let home = std::env::var_os("HOME").map_or_else(|| std::path::PathBuf::from("."), std::path::PathBuf::from);
        let resolved = sandbox_path(&home, path).map_err(|_| BrokerError::Sandbox)?;
        if let Some(parent) = resolved.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BrokerError::ScriptError(e.to_string()))?;
        }
        std::fs::write(&resolved, &bytes).map_err(|e| BrokerError::ScriptError(e.to_string()))?;

        Ok(ToolOutcome::json(json!({ "path": resolved, "bytes": bytes.len() })))
    }
}
