use std::time::Duration;

use crate::crypto::anchor::AnchorSource;
use crate::domain::error::EngineResult;

use super::login::LoginRequest;
use super::trust::TrustPolicyConfig;

/// Centralized defaults for the KeHua engine.
/// All opinionated defaults should be defined here for consistency.
pub struct EngineDefaults;

impl EngineDefaults {
    // Endpoint defaults
    pub const API_BASE_URL: &'static str = "https://120.48.25.62";
    pub const LOGIN_PATH: &'static str = "/api/users/login";
    pub const USER_AGENT: &'static str = concat!("kehua-engine/", env!("CARGO_PKG_VERSION"));

    // Trust defaults
    pub const ANCHOR: AnchorSource = AnchorSource::Builtin; // Ship with the KeHua API certificate
    pub const STRICT_MODE: bool = false; // Permissive: matches the shipped client, see DESIGN.md

    // Timeouts
    pub const CONNECT_TIMEOUT_SECS: u64 = 15;
    pub const REQUEST_TIMEOUT_SECS: u64 = 60; // Same as the platform URL session default
    pub const CHALLENGE_TIMEOUT_SECS: u64 = 30;
}

/// Configurable per-session limits.
#[derive(Debug, Clone, Copy)]
pub struct LimitsConfig {
    pub connect_timeout_secs: u64,
    /// Whole request, including the handshake and reading the body.
    pub request_timeout_secs: u64,
    /// How long the transport waits for a challenge completion before giving
    /// up on the connection.
    pub challenge_timeout_secs: u64,
}

impl LimitsConfig {
    /// Opinionated production defaults.
    pub fn defaults() -> Self {
        Self {
            connect_timeout_secs: EngineDefaults::CONNECT_TIMEOUT_SECS,
            request_timeout_secs: EngineDefaults::REQUEST_TIMEOUT_SECS,
            challenge_timeout_secs: EngineDefaults::CHALLENGE_TIMEOUT_SECS,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn challenge_timeout(&self) -> Duration {
        Duration::from_secs(self.challenge_timeout_secs)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

/// Everything needed to build one pinned HTTP session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub trust: TrustPolicyConfig,
    pub limits: LimitsConfig,
    /// Overrides `EngineDefaults::USER_AGENT`.
    pub user_agent: Option<String>,
}

/// Configuration for a single login attempt.
#[derive(Debug, Clone)]
pub struct LoginConfig {
    /// Scheme and authority of the API, e.g. `https://120.48.25.62:8443`.
    pub base_url: String,
    pub login_path: String,
    pub credentials: LoginRequest,
    pub session: SessionConfig,
}

impl LoginConfig {
    /// Secure opinionated defaults; caller supplies the credentials.
    pub fn secure_default(phone: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: EngineDefaults::API_BASE_URL.to_string(),
            login_path: EngineDefaults::LOGIN_PATH.to_string(),
            credentials: LoginRequest::new(phone, password),
            session: SessionConfig::default(),
        }
    }

    /// Full URL of the login endpoint.
    pub fn endpoint(&self) -> EngineResult<url::Url> {
        Ok(url::Url::parse(&self.base_url)?.join(&self.login_path)?)
    }
}
