//! `browser_get_element_styles` (spec 4.F.4).

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::connection::{BrokerContext, BrokerError};
use crate::primitives::cdp::query_node_id;

use super::traits::{Tool, ToolOutcome};

/// `browser_get_element_styles {selector, property?, pseudoState?}`: resolves
/// the node, optionally forces a pseudo-class while reading, and classifies
/// each matched declaration's source and whether it's applied, computed, or
/// overridden by a later entry for the same property.
pub struct BrowserGetElementStyles;

#[async_trait]
impl Tool for BrowserGetElementStyles {
    fn name(&self) -> &'static str {
        "browser_get_element_styles"
    }

    fn description(&self) -> &'static str {
        "Return the matched CSS declarations for an element, with source and override information."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "selector": { "type": "string" },
                "property": { "type": "string" },
                "pseudoState": { "type": "array", "items": { "type": "string" } },
            },
            "required": ["selector"],
        })
    }

    async fn execute(&self, ctx: &mut BrokerContext, args: Value, _raw_result: bool) -> Result<ToolOutcome, BrokerError> {
        let selector = args
            .get("selector")
            .and_then(Value::as_str)
            .ok_or_else(|| BrokerError::InvalidArguments("missing `selector`".to_string()))?;
        let property_filter = args.get("property").and_then(Value::as_str);
        let pseudo_states = args.get("pseudoState").and_then(Value::as_array).cloned();
        let has_pseudo = pseudo_states.as_ref().is_some_and(|s| !s.is_empty());

        let node_id = query_node_id(ctx, selector).await?;

        if has_pseudo {
            ctx.cdp(
                "CSS.forcePseudoState",
                json!({ "nodeId": node_id, "forcedPseudoClasses": pseudo_states }),
            )
            .await?;
        }

        let matched = ctx.cdp("CSS.getMatchedStylesForNode", json!({ "nodeId": node_id })).await;

        if has_pseudo {
            let _ = ctx
                .cdp("CSS.forcePseudoState", json!({ "nodeId": node_id, "forcedPseudoClasses": [] }))
                .await;
        }

        let matched = matched?;
        let stylesheet_file = resolve_stylesheet_file(ctx).await;
        let properties = collect_properties(&matched, stylesheet_file.as_deref());

        let filtered = match property_filter {
            Some(key) => {
                let mut map = BTreeMap::new();
                if let Some(entries) = properties.get(&key.to_lowercase()) {
                    map.insert(key.to_lowercase(), entries.clone());
                }
                map
            }
            None => properties,
        };

        Ok(ToolOutcome::json(json!({ "nodeId": node_id, "properties": filtered })))
    }
}

/// Takes the first `<link rel=stylesheet>` href on the page, per spec 4.F.4,
/// and derives the basename with query and content-hash suffix removed.
async fn resolve_stylesheet_file(ctx: &BrokerContext) -> Option<String> {
    let script = r#"(() => {
        const link = document.querySelector('link[rel="stylesheet"]');
        return link ? link.getAttribute('href') : null;
    })()"#;
    let href = ctx.eval(script, false).await.ok()?;
    let href = href.as_str()?;
    Some(basename_without_hash(href))
}

pub(crate) fn basename_without_hash(href: &str) -> String {
    let without_query = href.split(['?', '#']).next().unwrap_or(href);
    let basename = without_query.rsplit('/').next().unwrap_or(without_query);
    let (stem, ext) = basename.rsplit_once('.').unwrap_or((basename, ""));
    let stem = strip_trailing_hash(stem);
    if ext.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{ext}")
    }
}

/// Strips a trailing `-<hex>` or `.<hex>` segment of six or more hex
/// characters, e.g. `frontend-abc123` -> `frontend`.
fn strip_trailing_hash(stem: &str) -> &str {
    for sep in ['-', '.'] {
        if let Some(idx) = stem.rfind(sep) {
            let suffix = &stem[idx + 1..];
            if suffix.len() >= 6 && suffix.chars().all(|c| c.is_ascii_hexdigit()) {
                return &stem[..idx];
            }
        }
    }
    stem
}

#[derive(Debug, Clone)]
struct PropertyOccurrence {
    value: Value,
    source: String,
    selector: String,
    important: bool,
    disabled: bool,
}

/// Walks `matchedCSSRules` (CDP orders least-to-most specific) plus any
/// inline style, grouping declarations by lowercased property name and
/// tagging each occurrence `applied` / `computed` / `overridden`.
fn collect_properties(matched: &Value, stylesheet_file: Option<&str>) -> BTreeMap<String, Vec<Value>> {
    let mut by_property: BTreeMap<String, Vec<PropertyOccurrence>> = BTreeMap::new();

    let empty = Vec::new();
    let matched_rules = matched.get("matchedCSSRules").and_then(Value::as_array).unwrap_or(&empty);

    for entry in matched_rules {
        let rule = entry.get("rule");
        let origin = rule.and_then(|r| r.get("origin")).and_then(Value::as_str).unwrap_or("regular");
        let style = rule.and_then(|r| r.get("style"));
        let line = style
            .and_then(|s| s.get("range"))
            .and_then(|r| r.get("startLine"))
            .and_then(Value::as_u64)
            .unwrap_or(0);

        let (source, selector_text) = if origin == "user-agent" {
            ("browser default".to_string(), String::new())
        } else {
            let selector_text = rule
                .and_then(|r| r.get("selectorList"))
                .and_then(|s| s.get("text"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let file = stylesheet_file.unwrap_or("stylesheet");
            (format!("{file}:{}", line + 1), selector_text)
        };

        push_properties(&mut by_property, style, &source, &selector_text);
    }

    if let Some(inline) = matched.get("inlineStyle") {
        push_properties(&mut by_property, Some(inline), "inline", "element.style");
    }

    by_property
        .into_iter()
        .map(|(name, occurrences)| (name, classify(&occurrences)))
        .collect()
}

fn push_properties(
    by_property: &mut BTreeMap<String, Vec<PropertyOccurrence>>,
    style: Option<&Value>,
    source: &str,
    selector_text: &str,
) {
    let empty = Vec::new();
    let properties = style.and_then(|s| s.get("cssProperties")).and_then(Value::as_array).unwrap_or(&empty);
    for prop in properties {
        let name = prop.get("name").and_then(Value::as_str).unwrap_or_default().to_lowercase();
        if name.is_empty() {
            continue;
        }
        by_property.entry(name).or_default().push(PropertyOccurrence {
            value: prop.get("value").cloned().unwrap_or(Value::Null),
            source: source.to_string(),
            selector: selector_text.to_string(),
            important: prop.get("important").and_then(Value::as_bool).unwrap_or(false),
            disabled: prop.get("disabled").and_then(Value::as_bool).unwrap_or(false),
        });
    }
}

/// Classifies occurrences of a single property in document order: the last
/// enabled, non-`!important` entry is `applied` unless a later `!important`
/// entry exists, in which case the last `!important` entry is `applied`.
/// `!important` entries are never `overridden`. Earlier entries matching the
/// applied entry's source/selector/importance but with a different value are
/// `computed`; everything else is `overridden`.
fn classify(occurrences: &[PropertyOccurrence]) -> Vec<Value> {
    let applied_index = occurrences
        .iter()
        .rposition(|o| !o.disabled && o.important)
        .or_else(|| occurrences.iter().rposition(|o| !o.disabled));

    occurrences
        .iter()
        .enumerate()
        .map(|(i, occ)| {
            let status = if occ.disabled {
                "overridden"
            } else if Some(i) == applied_index {
                "applied"
            } else if occ.important {
                "computed"
            } else if let Some(ai) = applied_index {
                let applied = &occurrences[ai];
                if occ.source == applied.source && occ.selector == applied.selector && occ.important == applied.important
                    && occ.value != applied.value
                {
                    "computed"
                } else {
                    "overridden"
                }
            } else {
                "overridden"
            };

            json!({
                "value": occ.value,
                "source": occ.source,
                "selector": occ.selector,
                "important": occ.important,
                "disabled": occ.disabled,
                "status": status,
            })
        })
        .collect()
}
