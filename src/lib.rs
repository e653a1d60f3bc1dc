//! chanwatch - periodic health checker for LLM API gateway channels.
//!
//! Discovers each channel's available models, probes each model with a
//! minimal completion request, persists the verified model list back to the
//! gateway's store, and raises notifications when a channel's model set
//! changes.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod metrics;
pub mod notify;
pub mod storage;
pub mod util;

pub use error::{ChanwatchError, Result};
