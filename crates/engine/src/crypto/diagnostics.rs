//! Operator-facing summaries of a presented chain. Never feeds a decision.

use openssl::x509::X509;
use serde::Serialize;

use crate::domain::types::PresentedTrust;

use super::anchor::common_name;

pub const NO_COMMON_NAME: &str = "<no common name>";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateSummary {
    /// Position in the presented chain, leaf = 0.
    pub index: usize,
    pub common_name: String,
}

/// Lazily summarize each certificate of `trust`, best effort.
pub fn describe(trust: &PresentedTrust) -> impl Iterator<Item = CertificateSummary> + '_ {
    trust.certificates().enumerate().map(|(index, der)| CertificateSummary {
        index,
        common_name: X509::from_der(der)
            .ok()
            .and_then(|cert| common_name(&cert))
            .unwrap_or_else(|| NO_COMMON_NAME.to_string()),
    })
}

/// Emit one `debug` event per certificate.
pub fn log_chain(host: &str, trust: &PresentedTrust) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    tracing::debug!(host, certificates = trust.len(), "server presented chain");
    for summary in describe(trust) {
        tracing::debug!(host, index = summary.index, common_name = %summary.common_name, "presented certificate");
    }
}
