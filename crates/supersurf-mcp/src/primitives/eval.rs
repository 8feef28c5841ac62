//! Small JS snippets shared by several handlers. `eval`/`cdp`/`sleep`
//! themselves live on `BrokerContext`; this module holds the composed
//! expressions handlers reuse (clear, scroll, verify, file-upload setup).

use crate::connection::{BrokerContext, BrokerError};

use super::selector::to_expression;

/// Clears an input's value and dispatches `input` + `change`.
pub async fn clear_field(ctx: &BrokerContext, selector: &str) -> Result<(), BrokerError> {
    let expr = to_expression(selector);
    let script = format!(
        "(() => {{ const el = {expr}; if (!el) return false; \
         el.value = ''; \
         el.dispatchEvent(new Event('input', {{bubbles:true}})); \
         el.dispatchEvent(new Event('change', {{bubbles:true}})); \
         return true; }})()"
    );
    let value = ctx.eval(&script, false).await?;
    if value.as_bool() == Some(false) {
        return Err(BrokerError::ElementNotFound(format!("Element not found for selector: {selector}")));
    }
    Ok(())
}

/// Reads back an input's current value after typing, for observability.
pub async fn read_value(ctx: &BrokerContext, selector: &str) -> Result<String, BrokerError> {
    let expr = to_expression(selector);
    let script = format!("(() => {{ const el = {expr}; return el ? el.value : null; }})()");
    let value = ctx.eval(&script, false).await?;
    Ok(value.as_str().unwrap_or_default().to_string())
}

/// `verify_text_visible`: `document.body.innerText.includes(text)`.
pub async fn text_visible(ctx: &BrokerContext, text: &str) -> Result<bool, BrokerError> {
    let script = format!("document.body.innerText.includes({text:?})");
    let value = ctx.eval(&script, false).await?;
    Ok(value.as_bool().unwrap_or(false))
}

/// `verify_element_visible`: resolves the selector and checks
/// `getBoundingClientRect` plus computed `display`/`visibility`.
pub async fn element_visible(ctx: &BrokerContext, selector: &str) -> Result<bool, BrokerError> {
    let expr = to_expression(selector);
    let script = format!(
        "(() => {{ const el = {expr}; if (!el) return false; \
         const r = el.getBoundingClientRect(); const s = window.getComputedStyle(el); \
         return r.width > 0 && r.height > 0 && s.display !== 'none' && s.visibility !== 'hidden'; }})()"
    );
    let value = ctx.eval(&script, false).await?;
    Ok(value.as_bool().unwrap_or(false))
}

/// Applies or clears `select_option` on a `<select>` via the native
/// prototype setter, matching by value then by case-insensitive text.
pub async fn select_option(ctx: &BrokerContext, selector: &str, option: &str) -> Result<String, BrokerError> {
    let expr = to_expression(selector);
    let script = format!(
        "(() => {{ const el = {expr}; if (!el) return null; \
         const needle = {option:?}; \
         let match = Array.from(el.options).find(o => o.value === needle) \
           || Array.from(el.options).find(o => o.text.toLowerCase() === needle.toLowerCase()); \
         if (!match) return null; \
         const setter = Object.getOwnPropertyDescriptor(HTMLSelectElement.prototype, 'value').set; \
         setter.call(el, match.value); \
         el.dispatchEvent(new Event('input', {{bubbles:true}})); \
         el.dispatchEvent(new Event('change', {{bubbles:true}})); \
         return match.text; }})()"
    );
    let value = ctx.eval(&script, false).await?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| BrokerError::ElementNotFound(format!("No matching <option> `{option}` in {selector}")))
}

/// Highlight clickable elements with a 2px green outline before a
/// screenshot, returning a restore script to run afterward (best-effort;
/// failures never fail the handler).
pub async fn highlight_clickables(ctx: &BrokerContext) -> Result<(), BrokerError> {
    let script = "(() => { document.querySelectorAll('a, button, input, select, textarea, [onclick], [role=\"button\"]').forEach(el => { el.dataset.__prevOutline = el.style.outline; el.style.outline = '2px solid limegreen'; }); })()";
    let _ = ctx.eval(script, false).await;
    ctx.sleep(100).await;
    Ok(())
}

/// Restores styles touched by `highlight_clickables`.
pub async fn restore_highlight(ctx: &BrokerContext) {
    let script = "(() => { document.querySelectorAll('[data-__prev-outline]').forEach(el => { el.style.outline = el.dataset.__prevOutline || ''; delete el.dataset.__prevOutline; }); })()";
    let _ = ctx.eval(script, false).await;
}

/// `performance.getEntriesByType("navigation"/"paint")` merged page-side
/// metrics, to be combined with the extension's CDP `performanceMetrics`.
pub async fn page_timing_metrics(ctx: &BrokerContext) -> Result<serde_json::Value, BrokerError> {
    let script = "(() => { \
      const nav = performance.getEntriesByType('navigation')[0] || {}; \
      const paints = Object.fromEntries(performance.getEntriesByType('paint').map(p => [p.name, p.startTime])); \
      return { ttfb: nav.responseStart, domContentLoaded: nav.domContentLoadedEventEnd, load: nav.loadEventEnd, \
        firstPaint: paints['first-paint'], firstContentfulPaint: paints['first-contentful-paint'] }; \
    })()";
    ctx.eval(script, false).await
}
