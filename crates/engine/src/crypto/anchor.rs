//! The single certificate a pinned session trusts as a chain root.
//! Today supports the compiled-in KeHua certificate, a PEM file or an env
//! variable; exactly one of them is active per build/environment.

use std::path::PathBuf;
use std::str::FromStr;

use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::x509::{X509, X509Ref};
use thiserror::Error;

use crate::domain::error::{DecodeError, EngineError, EngineResult};

use super::pem::decode_pem;

/// Certificate of the KeHua API server (self-signed, SAN 120.48.25.62).
pub const KEHUA_API_ANCHOR_PEM: &str = include_str!("../../anchors/kehua_api.pem");

#[derive(Debug, Error)]
pub enum AnchorSourceError {
    #[error("Invalid anchor source: expected 'builtin', 'file:<path>' or 'env:<VAR>'")]
    InvalidScheme,
    #[error("Missing path for 'file:' anchor")]
    MissingPath,
    #[error("Missing variable name for 'env:' anchor")]
    MissingEnvVar,
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

/// Where the pinned anchor comes from.
/// Format examples:
/// - builtin
/// - file:/etc/kehua/anchor.pem
/// - env:KEHUA_ANCHOR_PEM
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorSource {
    Builtin,
    File(PathBuf),
    Env(String),
    /// PEM text supplied by the caller.
    Pem(String),
    /// Bytes handed to the DER parser as-is, without PEM decoding.
    /// An embedded PEM string passed this way is always rejected.
    RawBytes(Vec<u8>),
}

impl FromStr for AnchorSource {
    type Err = AnchorSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "builtin" {
            return Ok(AnchorSource::Builtin);
        }
        let (scheme, value) = s.split_once(':').ok_or(AnchorSourceError::InvalidScheme)?;
        match scheme {
            "file" if value.is_empty() => Err(AnchorSourceError::MissingPath),
            "file" => Ok(AnchorSource::File(PathBuf::from(value))),
            "env" if value.is_empty() => Err(AnchorSourceError::MissingEnvVar),
            "env" => Ok(AnchorSource::Env(value.to_string())),
            _ => Err(AnchorSourceError::InvalidScheme),
        }
    }
}

impl AnchorSource {
    /// Load and decode the anchor. Any failure here must abort session
    /// construction.
    pub fn load(&self) -> EngineResult<AnchorCertificate> {
        let anchor = match self {
            AnchorSource::Builtin => AnchorCertificate::from_pem(KEHUA_API_ANCHOR_PEM)?,
            AnchorSource::File(path) => {
                let text = std::fs::read_to_string(path)?;
                AnchorCertificate::from_pem(&text)?
            }
            AnchorSource::Env(var) => {
                let text = std::env::var(var)
                    .map_err(|_| EngineError::Config(AnchorSourceError::EnvVarNotFound(var.clone()).to_string()))?;
                AnchorCertificate::from_pem(&text)?
            }
            AnchorSource::Pem(text) => AnchorCertificate::from_pem(text)?,
            AnchorSource::RawBytes(bytes) => AnchorCertificate::from_der(bytes)?,
        };
        tracing::debug!(
            subject = %anchor.common_name().unwrap_or_default(),
            sha256 = %anchor.fingerprint_sha256().unwrap_or_default(),
            "loaded pinned anchor"
        );
        Ok(anchor)
    }
}

/// Immutable, decoded anchor. Cheap to share across threads behind an `Arc`.
#[derive(Clone)]
pub struct AnchorCertificate {
    cert: X509,
}

impl AnchorCertificate {
    pub fn from_der(bytes: &[u8]) -> Result<Self, DecodeError> {
        X509::from_der(bytes)
            .map(|cert| Self { cert })
            .map_err(|e| DecodeError::InvalidCertificate(e.to_string()))
    }

    pub fn from_pem(pem: &str) -> Result<Self, DecodeError> {
        let der = decode_pem(pem)?;
        Self::from_der(&der)
    }

    /// Uses the UTF-8 bytes of `text` directly as DER. Reproduces an older
    /// client build; PEM input always fails with `InvalidCertificate`.
    pub fn from_raw_bytes(text: &str) -> Result<Self, DecodeError> {
        Self::from_der(text.as_bytes())
    }

    pub fn x509(&self) -> &X509Ref {
        &self.cert
    }

    pub fn to_der(&self) -> EngineResult<Vec<u8>> {
        Ok(self.cert.to_der()?)
    }

    pub fn common_name(&self) -> Option<String> {
        common_name(&self.cert)
    }

    /// Lowercase hex SHA-256 over the DER encoding.
    pub fn fingerprint_sha256(&self) -> EngineResult<String> {
        let digest = self.cert.digest(MessageDigest::sha256())?;
        Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
    }
}

impl std::fmt::Debug for AnchorCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorCertificate")
            .field("common_name", &self.common_name())
            .finish()
    }
}

pub(crate) fn common_name(cert: &X509Ref) -> Option<String> {
    cert.subject_name()
        .entries_by_nid(Nid::COMMONNAME)
        .next()
        .and_then(|entry| std::str::from_utf8(entry.data().as_slice()).ok())
        .map(str::to_string)
}
