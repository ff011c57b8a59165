// Re-export all types so callers can use `domain::types::*`
// while the code stays organized by concern internally.

pub use challenge::*;
pub use config::*;
pub use login::*;
pub use trust::*;

// Module declarations
mod challenge;
mod config;
mod login;
mod trust;
