//! PEM envelope handling for a single embedded certificate.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::domain::error::DecodeError;

pub const PEM_BEGIN: &str = "-----BEGIN CERTIFICATE-----";
pub const PEM_END: &str = "-----END CERTIFICATE-----";

const LINE_WIDTH: usize = 64;

/// Strip the envelope and whitespace from `pem`, then base64-decode the body.
///
/// Exactly one `BEGIN`/`END CERTIFICATE` pair is accepted. Text outside the
/// envelope (such as the indentation of an embedded string literal) is
/// ignored.
pub fn decode_pem(pem: &str) -> Result<Vec<u8>, DecodeError> {
    if pem.matches(PEM_BEGIN).count() != 1 || pem.matches(PEM_END).count() != 1 {
        return Err(DecodeError::MissingEnvelope);
    }
    let start = pem.find(PEM_BEGIN).ok_or(DecodeError::MissingEnvelope)? + PEM_BEGIN.len();
    let end = pem.find(PEM_END).ok_or(DecodeError::MissingEnvelope)?;
    if end < start {
        return Err(DecodeError::MissingEnvelope);
    }

    let body: String = pem[start..end]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if body.is_empty() {
        return Err(DecodeError::MalformedBase64("empty certificate body".into()));
    }

    STANDARD
        .decode(body.as_bytes())
        .map_err(|e| DecodeError::MalformedBase64(e.to_string()))
}

/// Wrap DER bytes in a `CERTIFICATE` envelope with 64-character lines.
/// Empty input yields an envelope with no body, which [`decode_pem`] rejects.
pub fn encode_pem(der: &[u8]) -> String {
    let body = STANDARD.encode(der);
    let mut out = String::with_capacity(body.len() + body.len() / LINE_WIDTH + PEM_BEGIN.len() + PEM_END.len() + 4);
    out.push_str(PEM_BEGIN);
    out.push('\n');
    // base64 output is ASCII, so byte chunks are valid str boundaries
    for line in body.as_bytes().chunks(LINE_WIDTH) {
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str(PEM_END);
    out.push('\n');
    out
}
