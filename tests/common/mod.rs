//! Shared test infrastructure.

pub mod fixtures;
pub mod logger;
