// crates/engine/src/domain/challenge.rs

use super::types::{PresentedTrust, ProtectionSpace, TrustDecision};

/// Single-shot completion for a challenge. `FnOnce` rules out a second call;
/// handlers are responsible for making the first one on every path.
pub type CompletionHandler = Box<dyn FnOnce(TrustDecision) + Send + 'static>;

/// Implemented by whatever resolves transport challenges (the pinning
/// dispatcher today). Called from arbitrary transport threads.
///
/// The rustls bridge blocks the calling thread until `complete` runs or the
/// challenge timeout expires. Completing inline or from another OS thread is
/// fine; a completion that waits on a task spawned onto the caller's tokio
/// runtime may never run before the timeout, since that runtime's worker is
/// the thread being blocked.
pub trait ChallengeHandler: Send + Sync {
    fn on_challenge(&self, space: ProtectionSpace, complete: CompletionHandler);
}

/// Turns a presented chain plus host into a decision.
pub trait ServerTrustEvaluator: Send + Sync {
    fn evaluate(&self, trust: PresentedTrust, host: &str) -> TrustDecision;
}
