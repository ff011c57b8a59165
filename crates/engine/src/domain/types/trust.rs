use crate::crypto::anchor::AnchorSource;

use super::config::EngineDefaults;

/// Pinning policy for one session: which single anchor to trust and what to
/// do when a presented chain does not evaluate against it.
#[derive(Debug, Clone)]
pub struct TrustPolicyConfig {
    /// The only certificate accepted as a chain root. System roots are never
    /// consulted for pinned evaluation.
    pub anchor: AnchorSource,
    /// `false` (permissive) accepts the connection even when evaluation fails,
    /// logging a warning. `true` cancels the challenge instead.
    pub strict_mode: bool,
}

impl Default for TrustPolicyConfig {
    fn default() -> Self {
        Self {
            anchor: EngineDefaults::ANCHOR,
            strict_mode: EngineDefaults::STRICT_MODE,
        }
    }
}

impl TrustPolicyConfig {
    pub fn strict(anchor: AnchorSource) -> Self {
        Self { anchor, strict_mode: true }
    }

    pub fn permissive(anchor: AnchorSource) -> Self {
        Self { anchor, strict_mode: false }
    }
}
