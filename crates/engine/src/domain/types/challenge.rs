/// How the transport wants a challenge to be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationMethod {
    /// The server's TLS identity must be evaluated.
    ServerTrust,
    HttpBasic,
    HttpDigest,
    ClientCertificate,
    Other(String),
}

impl AuthenticationMethod {
    pub fn is_server_trust(&self) -> bool {
        matches!(self, AuthenticationMethod::ServerTrust)
    }
}

/// The chain a server offered during the handshake, leaf first, as DER.
/// Kept transport-neutral so both the rustls bridge and native shells can
/// hand their certificates in.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PresentedTrust {
    chain: Vec<Vec<u8>>,
}

impl PresentedTrust {
    pub fn from_der_chain<I, B>(chain: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Self {
            chain: chain.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn leaf(&self) -> Option<&[u8]> {
        self.chain.first().map(Vec::as_slice)
    }

    pub fn certificates(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.chain.iter().map(Vec::as_slice)
    }
}

impl std::fmt::Debug for PresentedTrust {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentedTrust")
            .field("certificates", &self.chain.len())
            .finish()
    }
}

/// Context of one challenge. Created by the transport for a single handshake
/// and dropped once the challenge resolves.
#[derive(Debug, Clone)]
pub struct ProtectionSpace {
    pub host: String,
    pub port: u16,
    pub authentication_method: AuthenticationMethod,
    pub server_trust: Option<PresentedTrust>,
}

impl ProtectionSpace {
    pub fn server_trust(host: impl Into<String>, port: u16, trust: PresentedTrust) -> Self {
        Self {
            host: host.into(),
            port,
            authentication_method: AuthenticationMethod::ServerTrust,
            server_trust: Some(trust),
        }
    }
}

/// Disposition for a challenge. Produced once, consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustDecision {
    /// Proceed, vouching for the presented trust object.
    UseCredential(PresentedTrust),
    CancelChallenge,
    DefaultHandling,
}

impl TrustDecision {
    pub fn kind(&self) -> DecisionKind {
        match self {
            TrustDecision::UseCredential(_) => DecisionKind::UseCredential,
            TrustDecision::CancelChallenge => DecisionKind::CancelChallenge,
            TrustDecision::DefaultHandling => DecisionKind::DefaultHandling,
        }
    }
}

/// Payload-free view of a `TrustDecision`, handy for logs and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum DecisionKind {
    UseCredential,
    CancelChallenge,
    DefaultHandling,
}

impl std::fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DecisionKind::UseCredential => "use-credential",
            DecisionKind::CancelChallenge => "cancel-challenge",
            DecisionKind::DefaultHandling => "default-handling",
        };
        f.write_str(s)
    }
}
