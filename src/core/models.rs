//! Core data types: channels, probe outcomes, and model-set diffs.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;

/// Channel name reserved by one gateway flavor's refresh workflow. Channels
/// with this name are transient artifacts and are never tested.
pub const RESERVED_CHANNEL_NAME: &str = "refresh";

/// Upstream provider family, resolved once from the gateway's numeric type
/// code when a channel row is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI (type code 1). Empty base URL defaults to the canonical API.
    OpenAi,
    /// SiliconFlow (type codes 40 and 999). Base URL is always forced.
    SiliconFlow,
    /// Any other provider; the stored base URL is used as-is.
    Other(i64),
}

impl ProviderKind {
    /// Resolve from the gateway's channel type code.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            1 => Self::OpenAi,
            40 | 999 => Self::SiliconFlow,
            other => Self::Other(other),
        }
    }

    /// The gateway's numeric type code.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::OpenAi => 1,
            Self::SiliconFlow => 40,
            Self::Other(code) => code,
        }
    }

    /// Apply the per-provider base URL policy to a stored URL.
    #[must_use]
    pub fn normalize_base_url(self, stored: &str) -> String {
        match self {
            Self::SiliconFlow => "https://api.siliconflow.cn".to_string(),
            Self::OpenAi if stored.is_empty() => "https://api.openai.com".to_string(),
            _ => stored.trim_end_matches('/').to_string(),
        }
    }
}

/// A registered upstream provider credential/endpoint entry.
///
/// Read-only within a cycle. `base_url` is already normalized through
/// [`ProviderKind::normalize_base_url`] at load time.
#[derive(Debug, Clone)]
pub struct Channel {
    pub id: i64,
    pub kind: ProviderKind,
    pub name: String,
    pub base_url: String,
    pub key: String,
    pub status: i64,
    /// External-facing model name -> upstream model name.
    pub model_mapping: HashMap<String, String>,
}

/// Result of probing one model on one channel.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub model: String,
    pub ok: bool,
    pub latency: Duration,
    /// HTTP status when a response was received.
    pub status: Option<u16>,
    /// Transport error text when no response was received.
    pub error: Option<String>,
}

impl ProbeOutcome {
    #[must_use]
    pub fn success(model: String, latency: Duration) -> Self {
        Self {
            model,
            ok: true,
            latency,
            status: Some(200),
            error: None,
        }
    }

    #[must_use]
    pub fn http_failure(model: String, latency: Duration, status: u16) -> Self {
        Self {
            model,
            ok: false,
            latency,
            status: Some(status),
            error: None,
        }
    }

    #[must_use]
    pub fn transport_failure(model: String, latency: Duration, error: String) -> Self {
        Self {
            model,
            ok: false,
            latency,
            status: None,
            error: Some(error),
        }
    }
}

/// The change in a channel's model set between two cycles.
///
/// `old_models` and `new_models` keep their source ordering; `added` and
/// `removed` are sorted and disjoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModelSetDiff {
    pub channel_id: i64,
    pub channel_name: String,
    pub old_models: Vec<String>,
    pub new_models: Vec<String>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl ModelSetDiff {
    /// Compute the diff between the persisted and freshly probed lists.
    #[must_use]
    pub fn compute(
        channel_id: i64,
        channel_name: String,
        old_models: Vec<String>,
        new_models: Vec<String>,
    ) -> Self {
        let old_set: BTreeSet<&str> = old_models.iter().map(String::as_str).collect();
        let new_set: BTreeSet<&str> = new_models.iter().map(String::as_str).collect();

        let added = new_set
            .difference(&old_set)
            .map(|s| (*s).to_string())
            .collect();
        let removed = old_set
            .difference(&new_set)
            .map(|s| (*s).to_string())
            .collect();

        Self {
            channel_id,
            channel_name,
            old_models,
            new_models,
            added,
            removed,
        }
    }

    /// Whether the model set is unchanged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
