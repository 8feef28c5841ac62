//! The broker's top-level state machine (spec 4.C).

/// Passive → Active → Connected, monotonic within one bridge lifetime and
/// reset to `Passive` on `disable` or shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Nothing listening; only connection tools are available.
    #[default]
    Passive,
    /// Bridge listening, no extension has connected yet.
    Active,
    /// Extension socket open and handshake seen.
    Connected,
}

impl ConnectionState {
    /// The glyph used in the status header.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Passive => "🔴",
            Self::Active => "🟡",
            Self::Connected => "🟢",
        }
    }
}
