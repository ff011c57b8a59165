// adapters/transport/common.rs

use tokio::runtime::{Handle, RuntimeFlavor};

use crate::domain::error::{EngineError, EngineResult};

pub fn run_on_current_thread<F, T>(fut: F) -> EngineResult<T>
where
  F: std::future::Future<Output = EngineResult<T>>,
{
  // If we're already inside a Tokio runtime, avoid creating a nested runtime.
  // Use block_in_place to safely block on the current multi-thread runtime.
  if let Ok(handle) = Handle::try_current() {
    if handle.runtime_flavor() != RuntimeFlavor::MultiThread {
      return Err(EngineError::Config(
        "blocking call made from a current-thread runtime; use the async API".into(),
      ));
    }
    return tokio::task::block_in_place(|| handle.block_on(fut));
  }

  // Otherwise, create a lightweight current-thread runtime just for this call.
  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .map_err(|e| EngineError::Config(format!("Failed to create tokio runtime: {}", e)))?;
  rt.block_on(fut)
}
