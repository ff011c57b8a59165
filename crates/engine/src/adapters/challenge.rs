// adapters/challenge.rs

use std::sync::Arc;

use crate::crypto::diagnostics;
use crate::crypto::evaluator::TrustEvaluator;
use crate::domain::challenge::{ChallengeHandler, CompletionHandler, ServerTrustEvaluator};
use crate::domain::error::EngineResult;
use crate::domain::types::{ProtectionSpace, TrustDecision, TrustPolicyConfig};

/// Routes transport challenges: server-trust challenges go to the evaluator,
/// everything else resolves to default handling.
pub struct ChallengeDispatcher<E = TrustEvaluator> {
  evaluator: Arc<E>,
}

impl<E> Clone for ChallengeDispatcher<E> {
  fn clone(&self) -> Self {
    Self { evaluator: Arc::clone(&self.evaluator) }
  }
}

impl<E: ServerTrustEvaluator> ChallengeDispatcher<E> {
  pub fn new(evaluator: Arc<E>) -> Self {
    Self { evaluator }
  }

  pub fn evaluator(&self) -> &E {
    &self.evaluator
  }

  /// Decide without a callback. `on_challenge` is built on top of this.
  pub fn decide(&self, space: ProtectionSpace) -> TrustDecision {
    let ProtectionSpace { host, port, authentication_method, server_trust } = space;
    match server_trust {
      Some(trust) if authentication_method.is_server_trust() => {
        diagnostics::log_chain(&host, &trust);
        let decision = self.evaluator.evaluate(trust, &host);
        tracing::info!(host = %host, port, decision = %decision.kind(), "resolved server trust challenge");
        decision
      }
      _ => {
        tracing::debug!(host = %host, port, method = ?authentication_method, "forwarding challenge to default handling");
        TrustDecision::DefaultHandling
      }
    }
  }
}

impl ChallengeDispatcher<TrustEvaluator> {
  /// Build the pinned dispatcher for a session. The anchor is decoded here so
  /// a bad anchor fails the session instead of a later challenge.
  pub fn from_policy(policy: &TrustPolicyConfig) -> EngineResult<Self> {
    Ok(Self::new(Arc::new(TrustEvaluator::from_policy(policy)?)))
  }
}

impl<E: ServerTrustEvaluator> ChallengeHandler for ChallengeDispatcher<E> {
  fn on_challenge(&self, space: ProtectionSpace, complete: CompletionHandler) {
    let decision = self.decide(space);
    complete(decision);
  }
}
