//! Selector-to-JS-expression translation and the did-you-mean fallback
//! scan (spec 4.D, 4.F.2 "Element-not-found fallback").

use serde::Deserialize;

use crate::connection::{BrokerContext, BrokerError};

/// Turn a user-supplied selector into a JS expression evaluating to an
/// `Element` or `null`. Understands the non-standard `:has-text("…")`
/// suffix.
#[must_use]
pub fn to_expression(selector: &str) -> String {
    if let Some((base, needle)) = parse_has_text(selector) {
        format!(
            "(() => {{ const base = {base:?}; const needle = {needle:?}; \
             for (const el of document.querySelectorAll(base || '*')) {{ \
             if (el.textContent && el.textContent.includes(needle)) return el; }} \
             return null; }})()"
        )
    } else {
        format!("document.querySelector({selector:?})")
    }
}

/// Splits `sel:has-text("needle")` into `(base, needle)`. `base` may be
/// empty, meaning "any element".
fn parse_has_text(selector: &str) -> Option<(&str, &str)> {
    let idx = selector.find(":has-text(\"")?;
    let base = &selector[..idx];
    let rest = &selector[idx + ":has-text(\"".len()..];
    let end = rest.find('"')?;
    Some((base, &rest[..end]))
}

/// One candidate surfaced by the did-you-mean scan.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub selector: String,
    pub visible: bool,
    pub text: String,
}

const SCAN_SCRIPT: &str = r"
(() => {
  const needle = NEEDLE_PLACEHOLDER.toLowerCase();
  const results = [];
  const walk = (node) => {
    for (const el of node.querySelectorAll('*')) {
      let direct = '';
      for (const child of el.childNodes) {
        if (child.nodeType === 3) direct += child.textContent;
      }
      if (direct && direct.toLowerCase().includes(needle)) {
        let selector;
        if (el.id) selector = '#' + el.id;
        else if (el.classList.length) selector = '.' + Array.from(el.classList).slice(0, 2).join('.');
        else if (el.getAttribute('role')) selector = '[role=' + el.getAttribute('role') + ']';
        else selector = el.tagName.toLowerCase();
        const rect = el.getBoundingClientRect();
        const style = window.getComputedStyle(el);
        const visible = style.display !== 'none' && style.visibility !== 'hidden'
          && parseFloat(style.opacity) !== 0 && rect.width > 0 && rect.height > 0;
        results.push({ selector, visible, text: direct.trim().slice(0, 80) });
      }
    }
  };
  walk(document);
  const visible = results.filter(r => r.visible).slice(0, 3);
  const hidden = results.filter(r => !r.visible).slice(0, 2);
  return [...visible, ...hidden];
})()
";

/// Run the DOM scan for elements whose direct text node includes `needle`
/// (case-insensitive), always returning up to 3 visible + 2 hidden
/// candidates, visible-first.
pub async fn find_alternatives(ctx: &BrokerContext, needle: &str) -> Result<Vec<Candidate>, BrokerError> {
    let script = SCAN_SCRIPT.replace("NEEDLE_PLACEHOLDER", &serde_json::to_string(needle).unwrap_or_default());
    let value = ctx.eval(&script, false).await?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Render candidates as the numbered "Did you mean?" list embedded in
/// `ElementNotFound` errors.
#[must_use]
pub fn format_did_you_mean(candidates: &[Candidate]) -> String {
    if candidates.is_empty() {
        return String::new();
    }
    let mut lines = vec!["Did you mean?".to_string()];
    for (i, c) in candidates.iter().enumerate() {
        let hidden = if c.visible { "" } else { " (hidden)" };
        lines.push(format!("{}. `{}` — \"{}\"{hidden}", i + 1, c.selector, c.text));
    }
    lines.join("\n")
}

/// Resolve a selector's element center `(x, y)`, running the did-you-mean
/// scan on failure when the selector carries a `:has-text(...)` clause.
pub async fn get_element_center(ctx: &BrokerContext, selector: &str) -> Result<(i64, i64), BrokerError> {
    let expr = to_expression(selector);
    let rect_expr = format!(
        "(() => {{ const el = {expr}; if (!el) return null; \
         const r = el.getBoundingClientRect(); \
         return {{ x: Math.round(r.left + r.width / 2), y: Math.round(r.top + r.height / 2) }}; }})()"
    );
    let value = ctx.eval(&rect_expr, false).await?;
    if value.is_null() {
        let needle = parse_has_text(selector).map(|(_, n)| n).unwrap_or(selector);
        let candidates = find_alternatives(ctx, needle).await.unwrap_or_default();
        let hint = format_did_you_mean(&candidates);
        let message = if hint.is_empty() {
            format!("Element not found for selector: {selector}")
        } else {
            format!("Element not found for selector: {selector}\n\n{hint}")
        };
        return Err(BrokerError::ElementNotFound(message));
    }
    let point: Point = serde_json::from_value(value)
        .map_err(|_| BrokerError::ElementNotFound(format!("Element not found for selector: {selector}")))?;
    Ok((point.x, point.y))
}

#[derive(Debug, Deserialize)]
struct Point {
    x: i64,
    y: i64,
}
