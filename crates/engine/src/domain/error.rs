// crates/engine/src/domain/error.rs
use thiserror::Error;

/// Failures turning an embedded anchor into a usable certificate.
/// These happen while a session is being built and are fatal to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
  #[error("expected exactly one BEGIN/END CERTIFICATE envelope")]
  MissingEnvelope,

  #[error("malformed base64 in certificate body: {0}")]
  MalformedBase64(String),

  #[error("invalid certificate: {0}")]
  InvalidCertificate(String),
}

/// Why a presented chain did not evaluate against the pinned anchor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrustEvaluationFailure {
  #[error("server presented no certificates")]
  EmptyChain,

  #[error("certificate #{index} in presented chain could not be parsed")]
  MalformedChain { index: usize },

  #[error("host is not usable for policy: {0}")]
  InvalidHost(String),

  #[error("chain rejected ({code}): {reason}")]
  Rejected { code: i32, reason: String },

  #[error("trust backend error: {0}")]
  Backend(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("configuration: {0}")]
  Config(String),

  #[error(transparent)]
  Decode(#[from] DecodeError),

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Url(#[from] url::ParseError),

  #[error(transparent)]
  Tls(#[from] openssl::error::ErrorStack),

  #[cfg(feature = "transport")]
  #[error(transparent)]
  Transport(#[from] reqwest::Error),

  // Useful when we catch_unwind to avoid crossing FFI boundaries with panics.
  #[error("internal panic: {0}")]
  Panic(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
