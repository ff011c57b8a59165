pub mod anchor;
pub mod diagnostics;
pub mod evaluator;
pub mod pem;
pub mod policy;
