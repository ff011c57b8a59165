use std::panic::{catch_unwind, AssertUnwindSafe};

use kehua_engine::domain::error::EngineError;
use kehua_engine::{
    AnchorSource, CertificateSummary, DecodeError, LimitsConfig, LoginConfig, LoginOutcome, PresentedTrust,
    SessionConfig, TrustDecision, TrustPolicyConfig,
};

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FfiError {
    #[error("{message}")]
    Generic { message: String },
}

impl From<EngineError> for FfiError {
    fn from(e: EngineError) -> Self {
        FfiError::Generic {
            message: e.to_string(),
        }
    }
}

impl From<DecodeError> for FfiError {
    fn from(e: DecodeError) -> Self {
        EngineError::from(e).into()
    }
}

// ===== FFI types mirroring the public Rust API (FFI-friendly) =====

#[derive(uniffi::Enum, Debug, Clone)]
pub enum FfiAnchor {
    /// The certificate compiled into the engine.
    Builtin,
    /// `builtin`, `file:<path>` or `env:<VAR>`.
    Source(String),
    /// PEM text handed over by the app bundle.
    Pem(String),
}

impl TryFrom<FfiAnchor> for AnchorSource {
    type Error = FfiError;
    fn try_from(v: FfiAnchor) -> Result<Self, Self::Error> {
        match v {
            FfiAnchor::Builtin => Ok(AnchorSource::Builtin),
            FfiAnchor::Source(s) => s.parse().map_err(|e| FfiError::Generic {
                message: format!("Invalid anchor source: {e}"),
            }),
            FfiAnchor::Pem(pem) => Ok(AnchorSource::Pem(pem)),
        }
    }
}

#[derive(uniffi::Record, Debug, Clone)]
pub struct FfiTrustPolicyConfig {
    pub anchor: FfiAnchor,
    pub strict_mode: bool,
}

impl TryFrom<FfiTrustPolicyConfig> for TrustPolicyConfig {
    type Error = FfiError;
    fn try_from(v: FfiTrustPolicyConfig) -> Result<Self, Self::Error> {
        Ok(TrustPolicyConfig {
            anchor: v.anchor.try_into()?,
            strict_mode: v.strict_mode,
        })
    }
}

#[derive(uniffi::Record, Debug, Clone, Copy)]
pub struct FfiLimitsConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub challenge_timeout_secs: u64,
}

impl From<FfiLimitsConfig> for LimitsConfig {
    fn from(v: FfiLimitsConfig) -> Self {
        LimitsConfig {
            connect_timeout_secs: v.connect_timeout_secs,
            request_timeout_secs: v.request_timeout_secs,
            challenge_timeout_secs: v.challenge_timeout_secs,
        }
    }
}

impl FfiLimitsConfig {
    pub fn defaults() -> Self {
        let d = LimitsConfig::defaults();
        Self {
            connect_timeout_secs: d.connect_timeout_secs,
            request_timeout_secs: d.request_timeout_secs,
            challenge_timeout_secs: d.challenge_timeout_secs,
        }
    }
}

#[derive(uniffi::Record, Debug, Clone)]
pub struct FfiLoginConfig {
    pub phone: String,
    pub password: String,
    /// Defaults to the production API when absent.
    pub base_url: Option<String>,
    pub login_path: Option<String>,
    pub trust_policy: Option<FfiTrustPolicyConfig>,
    pub limits: Option<FfiLimitsConfig>,
    pub user_agent: Option<String>,
}

impl TryFrom<FfiLoginConfig> for LoginConfig {
    type Error = FfiError;
    fn try_from(v: FfiLoginConfig) -> Result<Self, Self::Error> {
        let mut cfg = LoginConfig::secure_default(v.phone, v.password);
        if let Some(base_url) = v.base_url {
            cfg.base_url = base_url;
        }
        if let Some(login_path) = v.login_path {
            cfg.login_path = login_path;
        }
        cfg.session = SessionConfig {
            trust: v.trust_policy.map(TryInto::try_into).transpose()?.unwrap_or_default(),
            limits: v.limits.map(Into::into).unwrap_or_default(),
            user_agent: v.user_agent,
        };
        Ok(cfg)
    }
}

#[derive(uniffi::Record, Debug, Clone)]
pub struct FfiLoginOutcome {
    pub success: bool,
    pub http_status: Option<u16>,
    pub message: Option<String>,
}

impl From<LoginOutcome> for FfiLoginOutcome {
    fn from(v: LoginOutcome) -> Self {
        FfiLoginOutcome {
            success: v.success,
            http_status: v.http_status,
            message: v.message,
        }
    }
}

#[derive(uniffi::Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiTrustDecision {
    UseCredential,
    CancelChallenge,
    DefaultHandling,
}

impl From<TrustDecision> for FfiTrustDecision {
    fn from(v: TrustDecision) -> Self {
        match v {
            TrustDecision::UseCredential(_) => FfiTrustDecision::UseCredential,
            TrustDecision::CancelChallenge => FfiTrustDecision::CancelChallenge,
            TrustDecision::DefaultHandling => FfiTrustDecision::DefaultHandling,
        }
    }
}

#[derive(uniffi::Record, Debug, Clone)]
pub struct FfiCertificateSummary {
    pub index: u32,
    pub common_name: String,
}

impl From<CertificateSummary> for FfiCertificateSummary {
    fn from(v: CertificateSummary) -> Self {
        FfiCertificateSummary {
            index: v.index as u32,
            common_name: v.common_name,
        }
    }
}

// ===== High-level API, mirroring Rust surface =====

/// One pinned login attempt. Never throws: failures come back in the outcome.
#[uniffi::export]
pub fn login_ffi(cfg: FfiLoginConfig) -> FfiLoginOutcome {
    let cfg: LoginConfig = match cfg.try_into() {
        Ok(cfg) => cfg,
        Err(FfiError::Generic { message }) => return LoginOutcome::failed(message).into(),
    };
    catch_unwind(AssertUnwindSafe(|| kehua_engine::login(cfg)))
        .unwrap_or_else(|_| LoginOutcome::failed("internal error during login"))
        .into()
}

/// Evaluate a chain the native transport received (leaf first, DER).
#[uniffi::export]
pub fn evaluate_server_trust_ffi(
    chain_der: Vec<Vec<u8>>,
    host: String,
    port: u16,
    policy: Option<FfiTrustPolicyConfig>,
) -> Result<FfiTrustDecision, FfiError> {
    let policy: TrustPolicyConfig = policy.map(TryInto::try_into).transpose()?.unwrap_or_default();
    let trust = PresentedTrust::from_der_chain(chain_der);
    let decision = kehua_engine::evaluate_server_trust(trust, &host, port, &policy)?;
    Ok(decision.into())
}

#[uniffi::export]
pub fn describe_chain_ffi(chain_der: Vec<Vec<u8>>) -> Vec<FfiCertificateSummary> {
    let trust = PresentedTrust::from_der_chain(chain_der);
    kehua_engine::describe(&trust).map(Into::into).collect()
}

#[uniffi::export]
pub fn decode_pem_ffi(pem: String) -> Result<Vec<u8>, FfiError> {
    Ok(kehua_engine::decode_pem(&pem)?)
}

#[uniffi::export]
pub fn default_limits_ffi() -> FfiLimitsConfig {
    FfiLimitsConfig::defaults()
}

/// Install a fmt subscriber once. `filter` uses `RUST_LOG` syntax and falls
/// back to the environment, then `info`.
#[uniffi::export]
pub fn init_logging_ffi(filter: Option<String>) {
    use tracing_subscriber::EnvFilter;

    let filter = match filter {
        Some(f) => EnvFilter::try_new(f).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("info"));
    // A second call finds a subscriber already installed; that is fine.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

uniffi::setup_scaffolding!();
