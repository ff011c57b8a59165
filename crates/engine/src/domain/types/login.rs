use serde::Serialize;
use zeroize::Zeroize;

/// Body of `POST /api/users/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(phone: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            password: password.into(),
        }
    }

    /// Both fields must be non-empty before anything touches the network.
    pub fn is_complete(&self) -> bool {
        !self.phone.is_empty() && !self.password.is_empty()
    }
}

impl Drop for LoginRequest {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("phone", &self.phone)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What the login screen gets back. Never an error: every failure is folded
/// into `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LoginOutcome {
    pub fn succeeded(status: u16) -> Self {
        Self {
            success: true,
            http_status: Some(status),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            http_status: None,
            message: Some(message.into()),
        }
    }

    pub fn rejected(status: u16) -> Self {
        Self {
            success: false,
            http_status: Some(status),
            message: Some(format!("login failed: status code {status}")),
        }
    }
}
