// adapters/transport/verifier.rs

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::WebPkiSupportedAlgorithms;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, Error as TlsError, SignatureScheme};

use crate::crypto::evaluator::SystemTrust;
use crate::domain::challenge::ChallengeHandler;
use crate::domain::types::{PresentedTrust, ProtectionSpace, TrustDecision};

/// rustls hook that raises one server-trust challenge per handshake and
/// turns the handler's decision into a verification result.
pub struct PinnedVerifier {
  handler: Arc<dyn ChallengeHandler>,
  port: u16,
  challenge_timeout: Duration,
  algorithms: WebPkiSupportedAlgorithms,
}

impl PinnedVerifier {
  pub fn new(
    handler: Arc<dyn ChallengeHandler>,
    port: u16,
    challenge_timeout: Duration,
    algorithms: WebPkiSupportedAlgorithms,
  ) -> Self {
    Self { handler, port, challenge_timeout, algorithms }
  }

  /// Hand the challenge to the handler and wait for its single completion.
  /// The handler may complete on another thread.
  fn raise(&self, space: ProtectionSpace) -> Result<TrustDecision, TlsError> {
    let (tx, rx) = mpsc::sync_channel(1);
    self.handler.on_challenge(
      space,
      Box::new(move |decision| {
        let _ = tx.send(decision);
      }),
    );
    match rx.recv_timeout(self.challenge_timeout) {
      Ok(decision) => Ok(decision),
      Err(RecvTimeoutError::Timeout) => {
        tracing::warn!("server trust challenge not resolved within {:?}", self.challenge_timeout);
        Err(TlsError::General("server trust challenge timed out".into()))
      }
      Err(RecvTimeoutError::Disconnected) => {
        tracing::warn!("server trust challenge completion dropped without a decision");
        Err(TlsError::General("server trust challenge was never completed".into()))
      }
    }
  }
}

impl std::fmt::Debug for PinnedVerifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("PinnedVerifier")
      .field("port", &self.port)
      .field("challenge_timeout", &self.challenge_timeout)
      .finish()
  }
}

impl ServerCertVerifier for PinnedVerifier {
  fn verify_server_cert(
    &self,
    end_entity: &CertificateDer<'_>,
    intermediates: &[CertificateDer<'_>],
    server_name: &ServerName<'_>,
    _ocsp_response: &[u8],
    _now: UnixTime,
  ) -> Result<ServerCertVerified, TlsError> {
    let host = server_host(server_name);
    let trust = PresentedTrust::from_der_chain(
      std::iter::once(end_entity)
        .chain(intermediates)
        .map(|cert| cert.as_ref().to_vec()),
    );

    let space = ProtectionSpace::server_trust(host.clone(), self.port, trust.clone());
    match self.raise(space)? {
      TrustDecision::UseCredential(_) => Ok(ServerCertVerified::assertion()),
      TrustDecision::CancelChallenge => Err(TlsError::InvalidCertificate(
        CertificateError::ApplicationVerificationFailure,
      )),
      TrustDecision::DefaultHandling => match SystemTrust.evaluate_chain(&trust, &host) {
        Ok(()) => Ok(ServerCertVerified::assertion()),
        Err(failure) => {
          tracing::warn!(host = %host, %failure, "default trust evaluation failed");
          Err(TlsError::InvalidCertificate(CertificateError::UnknownIssuer))
        }
      },
    }
  }

  fn verify_tls12_signature(
    &self,
    message: &[u8],
    cert: &CertificateDer<'_>,
    dss: &DigitallySignedStruct,
  ) -> Result<HandshakeSignatureValid, TlsError> {
    rustls::crypto::verify_tls12_signature(message, cert, dss, &self.algorithms)
  }

  fn verify_tls13_signature(
    &self,
    message: &[u8],
    cert: &CertificateDer<'_>,
    dss: &DigitallySignedStruct,
  ) -> Result<HandshakeSignatureValid, TlsError> {
    rustls::crypto::verify_tls13_signature(message, cert, dss, &self.algorithms)
  }

  fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
    self.algorithms.supported_schemes()
  }
}

fn server_host(name: &ServerName<'_>) -> String {
  match name {
    ServerName::DnsName(dns) => dns.as_ref().to_string(),
    ServerName::IpAddress(ip) => std::net::IpAddr::from(*ip).to_string(),
    // Unknown variants leave the host empty, which fails policy construction.
    _ => String::new(),
  }
}
