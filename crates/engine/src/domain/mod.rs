pub mod challenge;
pub mod error;
pub mod types;
