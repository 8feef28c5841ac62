//! Status header formatting (spec 4.C, P6/I6): a pure function over an
//! immutable snapshot so "never mutate state during formatting" is enforced
//! by the signature, not by convention.

use super::state::ConnectionState;

/// Everything the header needs, copied out of `BrokerContext` at the
/// moment of formatting.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub state: ConnectionState,
    pub version: &'static str,
    pub debug_mode: bool,
    pub connected_browser_name: Option<String>,
    pub attached_tab_url: Option<String>,
    pub stealth: bool,
    pub debug_timestamp: Option<String>,
}

const TAB_URL_TRUNCATE_LEN: usize = 60;

/// Render the one-line header prepended to every content result.
#[must_use]
pub fn format_status_header(snapshot: &StatusSnapshot) -> String {
    let mut tokens: Vec<String> = Vec::new();

    let mode = "Free";
    let mut head = format!("{} {mode} v{}", snapshot.state.glyph(), snapshot.version);
    if snapshot.state == ConnectionState::Passive {
        head.push_str(" | Disabled");
    } else if snapshot.state == ConnectionState::Active {
        head.push_str(" | Waiting for extension");
    }
    tokens.push(head);

    if snapshot.state == ConnectionState::Connected {
        if let Some(name) = &snapshot.connected_browser_name {
            tokens.push(format!("🌐 {name}"));
        }
    }

    if let Some(url) = &snapshot.attached_tab_url {
        let truncated = crate::logger::truncate_string(url, TAB_URL_TRUNCATE_LEN);
        tokens.push(format!("📄 Tab: {truncated}"));
    }

    if snapshot.stealth {
        tokens.push("🥷 Stealth".to_string());
    }

    if snapshot.debug_mode {
        if let Some(ts) = &snapshot.debug_timestamp {
            tokens.push(format!("[{ts}]"));
        }
    }

    tokens.join(" | ")
}
