//! Persisted gateway store.
//!
//! [`ChannelStore`] is the transactional boundary to the gateway's database.
//! The shipped implementation is SQLite; the trait keeps the rest of the
//! checker independent of the dialect.

pub mod schema;
pub mod sqlite;

pub use schema::run_migrations;
pub use sqlite::SqliteStore;

use crate::core::models::Channel;
use crate::error::Result;

/// Access to the gateway's channel and capability tables.
///
/// Implementations must make [`ChannelStore::update_models`] atomic: the
/// channel's model list and its capability rows commit as one unit, and a
/// failure leaves prior state fully intact.
pub trait ChannelStore: Send + Sync {
    /// All channel rows, with provider-specific base URL normalization
    /// applied. No exclusion filtering happens here.
    fn list_channels(&self) -> Result<Vec<Channel>>;

    /// The persisted model list for one channel.
    fn get_models(&self, channel_id: i64) -> Result<Vec<String>>;

    /// Atomically replace the channel's model list, prune capability rows
    /// for models no longer present, and mark remaining rows enabled.
    fn update_models(&self, channel_id: i64, models: &[String]) -> Result<()>;
}
