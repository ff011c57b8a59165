// adapters/transport/login.rs

use crate::domain::types::{LoginConfig, LoginOutcome};

use super::common::run_on_current_thread;
use super::session::PinnedSession;

/// One login attempt: build a fresh pinned session, POST the credentials,
/// map the result. No retries.
pub async fn login_async(config: LoginConfig) -> LoginOutcome {
  if !config.credentials.is_complete() {
    return LoginOutcome::failed("phone and password must not be empty");
  }

  let endpoint = match config.endpoint() {
    Ok(url) => url,
    Err(e) => return LoginOutcome::failed(format!("invalid login endpoint: {e}")),
  };

  let session = match PinnedSession::new(&config.session, &endpoint) {
    Ok(session) => session,
    Err(e) => {
      tracing::error!(error = %e, "cannot build pinned session");
      return LoginOutcome::failed(format!("cannot establish secure session: {e}"));
    }
  };

  let response = match session.post_json(&endpoint, &config.credentials).await {
    Ok(response) => response,
    Err(e) => {
      tracing::warn!(url = %endpoint, error = %e, "login request failed");
      return LoginOutcome::failed(format!("request failed: {e}"));
    }
  };

  if response.status == 200 {
    tracing::info!(url = %endpoint, "login succeeded");
    LoginOutcome::succeeded(response.status)
  } else {
    tracing::warn!(
      url = %endpoint,
      status = response.status,
      body = %String::from_utf8_lossy(&response.body),
      "login rejected by server"
    );
    LoginOutcome::rejected(response.status)
  }
}

/// Blocking wrapper around [`login_async`] for callers without a runtime
/// (FFI, tests, simple CLIs).
pub fn login(config: LoginConfig) -> LoginOutcome {
  run_on_current_thread(async { Ok(login_async(config).await) })
    .unwrap_or_else(|e| LoginOutcome::failed(format!("request failed: {e}")))
}
