// adapters/transport/session.rs

use std::sync::Arc;

use serde::Serialize;
use url::Url;

use crate::adapters::challenge::ChallengeDispatcher;
use crate::domain::error::{EngineError, EngineResult};
use crate::domain::types::{EngineDefaults, SessionConfig};

use super::verifier::PinnedVerifier;

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
  pub status: u16,
  pub body: Vec<u8>,
}

/// HTTP client for one origin whose server trust is decided by the pinning
/// dispatcher. Build a fresh one per login attempt.
pub struct PinnedSession {
  client: reqwest::Client,
  origin: Url,
  dispatcher: ChallengeDispatcher,
}

impl PinnedSession {
  /// Decodes the anchor and wires the dispatcher into the TLS layer. Any
  /// anchor problem fails here, before a connection is attempted.
  pub fn new(config: &SessionConfig, origin: &Url) -> EngineResult<Self> {
    if origin.scheme() != "https" {
      return Err(EngineError::Config("pinned sessions require an https URL".into()));
    }
    if origin.host_str().is_none() {
      return Err(EngineError::Config("URL missing host".into()));
    }
    let port = origin.port_or_known_default().unwrap_or(443);

    let dispatcher = ChallengeDispatcher::from_policy(&config.trust)?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let verifier = PinnedVerifier::new(
      Arc::new(dispatcher.clone()),
      port,
      config.limits.challenge_timeout(),
      provider.signature_verification_algorithms,
    );
    let tls = rustls::ClientConfig::builder_with_provider(provider)
      .with_safe_default_protocol_versions()
      .map_err(|e| EngineError::Config(format!("TLS configuration: {e}")))?
      .dangerous()
      .with_custom_certificate_verifier(Arc::new(verifier))
      .with_no_client_auth();

    let user_agent = config
      .user_agent
      .clone()
      .unwrap_or_else(|| EngineDefaults::USER_AGENT.to_string());

    let client = reqwest::Client::builder()
      .use_preconfigured_tls(tls)
      .connect_timeout(config.limits.connect_timeout())
      .timeout(config.limits.request_timeout())
      .redirect(reqwest::redirect::Policy::none())
      .user_agent(user_agent)
      .build()?;

    Ok(Self {
      client,
      origin: origin.clone(),
      dispatcher,
    })
  }

  pub fn dispatcher(&self) -> &ChallengeDispatcher {
    &self.dispatcher
  }

  /// POST `body` as JSON. Only URLs on the session's origin are allowed.
  pub async fn post_json<T: Serialize + ?Sized>(&self, url: &Url, body: &T) -> EngineResult<HttpResponse> {
    if url.origin() != self.origin.origin() {
      return Err(EngineError::Config(format!(
        "{} is outside the session origin {}",
        url,
        self.origin.origin().ascii_serialization()
      )));
    }
    let response = self.client.post(url.clone()).json(body).send().await?;
    let status = response.status().as_u16();
    let body = response.bytes().await?.to_vec();
    Ok(HttpResponse { status, body })
  }
}
