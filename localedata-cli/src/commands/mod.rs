//! CLI command implementations.

pub mod common;
pub mod preload;
pub mod resolve;
pub mod roots;
