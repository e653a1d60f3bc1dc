//! Core test-orchestration engine.

pub mod context;
pub mod http;
pub mod limiter;
pub mod logging;
pub mod models;
pub mod probe;
pub mod reconcile;
pub mod retry;
pub mod scheduler;
pub mod tester;
pub mod uptime;

pub use context::AppContext;
pub use limiter::RateLimiter;
pub use models::{Channel, ModelSetDiff, ProbeOutcome, ProviderKind, RESERVED_CHANNEL_NAME};
pub use probe::{completion_url, probe_model};
pub use reconcile::{apply_mapping, reconcile};
pub use retry::retry_with_backoff;
pub use scheduler::{CycleSummary, run, run_cycle};
pub use tester::{resolve_candidates, test_channel};
pub use uptime::UptimePusher;
