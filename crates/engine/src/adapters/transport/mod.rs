// HTTPS transport wired to the pinning dispatcher (feature "transport").

mod common;
mod login;
mod session;
mod verifier;

pub use common::run_on_current_thread;
pub use login::{login, login_async};
pub use session::{HttpResponse, PinnedSession};
pub use verifier::PinnedVerifier;
