pub mod challenge;

#[cfg(feature = "transport")]
pub mod transport;
