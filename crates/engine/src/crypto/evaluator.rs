//! Pinned chain evaluation: the presented chain must terminate at the one
//! configured anchor and the leaf must be valid for the challenge host.

use std::sync::Arc;

use openssl::error::ErrorStack;
use openssl::stack::Stack;
use openssl::x509::store::{X509Store, X509StoreBuilder};
use openssl::x509::verify::X509VerifyParam;
use openssl::x509::{X509, X509StoreContext};

use crate::domain::challenge::ServerTrustEvaluator;
use crate::domain::error::{EngineResult, TrustEvaluationFailure};
use crate::domain::types::{PresentedTrust, TrustDecision, TrustPolicyConfig};

use super::anchor::AnchorCertificate;
use super::policy::{build_ssl_policy, SslPolicy};

/// Evaluates presented chains against a single pinned anchor.
///
/// In permissive mode (the default) a failed evaluation is logged and the
/// connection is still accepted. Strict mode cancels it instead.
#[derive(Debug, Clone)]
pub struct TrustEvaluator {
    anchor: Arc<AnchorCertificate>,
    strict_mode: bool,
}

impl TrustEvaluator {
    pub fn new(anchor: Arc<AnchorCertificate>, strict_mode: bool) -> Self {
        if !strict_mode {
            tracing::warn!("trust evaluator running in permissive mode: failed pin checks will not block connections");
        }
        Self { anchor, strict_mode }
    }

    /// Load the configured anchor and build the evaluator. Fails when the
    /// anchor cannot be decoded.
    pub fn from_policy(policy: &TrustPolicyConfig) -> EngineResult<Self> {
        let anchor = policy.anchor.load()?;
        Ok(Self::new(Arc::new(anchor), policy.strict_mode))
    }

    pub fn anchor(&self) -> &AnchorCertificate {
        &self.anchor
    }

    pub fn is_strict(&self) -> bool {
        self.strict_mode
    }

    /// Raw evaluation outcome, before the decision policy is applied.
    pub fn evaluate_chain(&self, trust: &PresentedTrust, host: &str) -> Result<(), TrustEvaluationFailure> {
        let policy = host_policy(host)?;
        let store = pinned_store(&self.anchor, &policy).map_err(backend)?;
        verify_against(&store, trust)
    }
}

impl ServerTrustEvaluator for TrustEvaluator {
    fn evaluate(&self, trust: PresentedTrust, host: &str) -> TrustDecision {
        match self.evaluate_chain(&trust, host) {
            Ok(()) => {
                tracing::info!(host, "server trust evaluated against pinned anchor");
                TrustDecision::UseCredential(trust)
            }
            Err(failure) if self.strict_mode => {
                tracing::warn!(host, %failure, "server trust rejected, cancelling challenge");
                TrustDecision::CancelChallenge
            }
            Err(failure) => {
                tracing::warn!(
                    host,
                    %failure,
                    "server trust evaluation FAILED; accepting connection anyway (permissive mode)"
                );
                TrustDecision::UseCredential(trust)
            }
        }
    }
}

/// Evaluation against the platform's default roots. Used when a server-trust
/// challenge is answered with default handling.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTrust;

impl SystemTrust {
    pub fn evaluate_chain(&self, trust: &PresentedTrust, host: &str) -> Result<(), TrustEvaluationFailure> {
        let policy = host_policy(host)?;
        let store = system_store(&policy).map_err(backend)?;
        verify_against(&store, trust)
    }
}

fn host_policy(host: &str) -> Result<SslPolicy, TrustEvaluationFailure> {
    build_ssl_policy(host).map_err(|e| TrustEvaluationFailure::InvalidHost(e.to_string()))
}

fn backend(e: ErrorStack) -> TrustEvaluationFailure {
    TrustEvaluationFailure::Backend(e.to_string())
}

/// A store whose only trusted certificate is `anchor`; system roots are never
/// loaded into it.
fn pinned_store(anchor: &AnchorCertificate, policy: &SslPolicy) -> Result<X509Store, ErrorStack> {
    let mut builder = X509StoreBuilder::new()?;
    builder.add_cert(anchor.x509().to_owned())?;
    let mut param = X509VerifyParam::new()?;
    policy.apply(&mut param)?;
    builder.set_param(&param)?;
    Ok(builder.build())
}

fn system_store(policy: &SslPolicy) -> Result<X509Store, ErrorStack> {
    let mut builder = X509StoreBuilder::new()?;
    builder.set_default_paths()?;
    let mut param = X509VerifyParam::new()?;
    policy.apply(&mut param)?;
    builder.set_param(&param)?;
    Ok(builder.build())
}

fn verify_against(store: &X509Store, trust: &PresentedTrust) -> Result<(), TrustEvaluationFailure> {
    let mut certs = Vec::with_capacity(trust.len());
    for (index, der) in trust.certificates().enumerate() {
        let cert = X509::from_der(der).map_err(|_| TrustEvaluationFailure::MalformedChain { index })?;
        certs.push(cert);
    }
    let (leaf, rest) = certs.split_first().ok_or(TrustEvaluationFailure::EmptyChain)?;

    let mut untrusted = Stack::new().map_err(backend)?;
    for cert in rest {
        untrusted.push(cert.clone()).map_err(backend)?;
    }

    let mut ctx = X509StoreContext::new().map_err(backend)?;
    let (ok, result) = ctx
        .init(store, leaf, &untrusted, |c| {
            let ok = c.verify_cert()?;
            Ok((ok, c.error()))
        })
        .map_err(backend)?;

    if ok {
        Ok(())
    } else {
        Err(TrustEvaluationFailure::Rejected {
            code: result.as_raw(),
            reason: result.error_string().to_string(),
        })
    }
}
