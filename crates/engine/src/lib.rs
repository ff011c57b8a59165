// crates/engine/src/lib.rs

//! Public facade for the KeHua engine.
//! Exposes a stable API and re-exports types for consumers (mobile shells via FFI).
//!
//! The core is a certificate-pinning trust evaluator: every TLS handshake of
//! the authenticated channel raises a challenge, and the presented chain is
//! evaluated against one compiled-in (or configured) anchor instead of the
//! platform roots.

pub mod adapters;
pub mod crypto;
pub mod domain;

use std::sync::mpsc;

use domain::error::{EngineError, EngineResult};
pub use domain::types::{PresentedTrust, ProtectionSpace, TrustDecision, TrustPolicyConfig};

/// Evaluate a chain handed over by a native transport (URLSession delegate,
/// OkHttp trust manager) as one server-trust challenge.
///
/// The anchor is loaded first; a bad anchor is an error, not a decision.
pub fn evaluate_server_trust(
    chain: PresentedTrust,
    host: &str,
    port: u16,
    policy: &TrustPolicyConfig,
) -> EngineResult<TrustDecision> {
    let dispatcher = ChallengeDispatcher::from_policy(policy)?;
    let (tx, rx) = mpsc::channel();
    dispatcher.on_challenge(
        ProtectionSpace::server_trust(host, port, chain),
        Box::new(move |decision| {
            let _ = tx.send(decision);
        }),
    );
    rx.recv()
        .map_err(|_| EngineError::Panic("challenge completed without a decision".into()))
}

/// Attempt a pinned login. Blocks; use [`login_async`] inside a runtime.
#[cfg(feature = "transport")]
pub fn login(cfg: LoginConfig) -> LoginOutcome {
    adapters::transport::login(cfg)
}

#[cfg(feature = "transport")]
pub async fn login_async(cfg: LoginConfig) -> LoginOutcome {
    adapters::transport::login_async(cfg).await
}

// Re-exports for convenience
pub use adapters::challenge::ChallengeDispatcher;
pub use crypto::anchor::{AnchorCertificate, AnchorSource};
pub use crypto::diagnostics::{describe, CertificateSummary};
pub use crypto::evaluator::{SystemTrust, TrustEvaluator};
pub use crypto::pem::{decode_pem, encode_pem};
pub use crypto::policy::{build_ssl_policy, PeerName, SslPolicy};
pub use domain::challenge::{ChallengeHandler, CompletionHandler, ServerTrustEvaluator};
pub use domain::error::{DecodeError, TrustEvaluationFailure};
pub use domain::types::{
    AuthenticationMethod, DecisionKind, EngineDefaults, LimitsConfig, LoginConfig, LoginOutcome,
    LoginRequest, SessionConfig,
};

#[cfg(feature = "transport")]
pub use adapters::transport::{PinnedSession, PinnedVerifier};
