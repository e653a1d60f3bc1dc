//! Observability collaborator: counters, gauges, and latency summaries.
//!
//! Metric families mirror the checker's domains (channel status, probe
//! outcomes, cycle timing, store operations, notification and uptime-push
//! delivery) and are rendered in Prometheus text exposition format for
//! external scraping. Nothing in the core reads these values back.

pub mod server;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Mutex;

/// Metric type used for exposition headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricType {
    Counter,
    Gauge,
    Summary,
}

impl MetricType {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Summary => "summary",
        }
    }
}

struct Descriptor {
    name: &'static str,
    help: &'static str,
    kind: MetricType,
}

const DESCRIPTORS: &[Descriptor] = &[
    Descriptor {
        name: "channel_status",
        help: "Current status of channels (1 = active, 0 = inactive)",
        kind: MetricType::Gauge,
    },
    Descriptor {
        name: "channel_test_total",
        help: "Total number of channel tests",
        kind: MetricType::Counter,
    },
    Descriptor {
        name: "model_test_total",
        help: "Total number of model tests",
        kind: MetricType::Counter,
    },
    Descriptor {
        name: "model_availability",
        help: "Model availability (1 = available, 0 = unavailable)",
        kind: MetricType::Gauge,
    },
    Descriptor {
        name: "model_response_time_seconds",
        help: "Response time for model tests in seconds",
        kind: MetricType::Summary,
    },
    Descriptor {
        name: "test_cycle_total",
        help: "Total number of test cycles completed",
        kind: MetricType::Counter,
    },
    Descriptor {
        name: "test_cycle_duration_seconds",
        help: "Duration of test cycles in seconds",
        kind: MetricType::Summary,
    },
    Descriptor {
        name: "active_channels_total",
        help: "Total number of active channels",
        kind: MetricType::Gauge,
    },
    Descriptor {
        name: "available_models_total",
        help: "Total number of available models per channel",
        kind: MetricType::Gauge,
    },
    Descriptor {
        name: "database_operation_total",
        help: "Total number of database operations",
        kind: MetricType::Counter,
    },
    Descriptor {
        name: "database_operation_duration_seconds",
        help: "Duration of database operations in seconds",
        kind: MetricType::Summary,
    },
    Descriptor {
        name: "notification_total",
        help: "Total number of notifications sent",
        kind: MetricType::Counter,
    },
    Descriptor {
        name: "uptime_push_total",
        help: "Total number of uptime pushes",
        kind: MetricType::Counter,
    },
];

#[derive(Debug, Clone, Copy, Default)]
struct SummaryValue {
    sum: f64,
    count: u64,
}

type Series = BTreeMap<String, f64>;
type SummarySeries = BTreeMap<String, SummaryValue>;

/// Process-wide metrics registry. Cheap to share behind an `Arc`.
#[derive(Default)]
pub struct Metrics {
    counters: Mutex<BTreeMap<&'static str, Series>>,
    gauges: Mutex<BTreeMap<&'static str, Series>>,
    summaries: Mutex<BTreeMap<&'static str, SummarySeries>>,
}

fn labels(pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let body = pairs
        .iter()
        .map(|(k, v)| format!("{k}=\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{body}}}")
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn inc(&self, name: &'static str, label_pairs: &[(&str, &str)]) {
        let mut counters = self.counters.lock().expect("metrics lock");
        *counters
            .entry(name)
            .or_default()
            .entry(labels(label_pairs))
            .or_insert(0.0) += 1.0;
    }

    fn set(&self, name: &'static str, label_pairs: &[(&str, &str)], value: f64) {
        let mut gauges = self.gauges.lock().expect("metrics lock");
        gauges
            .entry(name)
            .or_default()
            .insert(labels(label_pairs), value);
    }

    fn observe(&self, name: &'static str, label_pairs: &[(&str, &str)], value: f64) {
        let mut summaries = self.summaries.lock().expect("metrics lock");
        let entry = summaries
            .entry(name)
            .or_default()
            .entry(labels(label_pairs))
            .or_default();
        entry.sum += value;
        entry.count += 1;
    }

    // --- channel metrics ---

    pub fn channel_status(&self, id: i64, name: &str, kind_code: i64, status: i64) {
        let id = id.to_string();
        let kind = kind_code.to_string();
        self.set(
            "channel_status",
            &[
                ("channel_id", &id),
                ("channel_name", name),
                ("channel_type", &kind),
            ],
            status as f64,
        );
    }

    pub fn record_channel_test(&self, id: i64, name: &str, status: &str) {
        let id = id.to_string();
        self.inc(
            "channel_test_total",
            &[("channel_id", &id), ("channel_name", name), ("status", status)],
        );
    }

    pub fn set_active_channels(&self, count: usize) {
        self.set("active_channels_total", &[], count as f64);
    }

    pub fn set_available_models(&self, id: i64, name: &str, count: usize) {
        let id = id.to_string();
        self.set(
            "available_models_total",
            &[("channel_id", &id), ("channel_name", name)],
            count as f64,
        );
    }

    // --- model metrics ---

    pub fn record_model_test(&self, id: i64, name: &str, model: &str, status: &str) {
        let id = id.to_string();
        self.inc(
            "model_test_total",
            &[
                ("channel_id", &id),
                ("channel_name", name),
                ("model", model),
                ("status", status),
            ],
        );
    }

    pub fn model_availability(&self, id: i64, name: &str, model: &str, up: bool) {
        let id = id.to_string();
        self.set(
            "model_availability",
            &[("channel_id", &id), ("channel_name", name), ("model", model)],
            if up { 1.0 } else { 0.0 },
        );
    }

    pub fn observe_response_time(&self, id: i64, name: &str, model: &str, seconds: f64) {
        let id = id.to_string();
        self.observe(
            "model_response_time_seconds",
            &[("channel_id", &id), ("channel_name", name), ("model", model)],
            seconds,
        );
    }

    // --- cycle metrics ---

    pub fn record_cycle(&self, seconds: f64) {
        self.inc("test_cycle_total", &[]);
        self.observe("test_cycle_duration_seconds", &[], seconds);
    }

    // --- store metrics ---

    pub fn record_db_operation(&self, operation: &str, ok: bool) {
        self.inc(
            "database_operation_total",
            &[("operation", operation), ("status", status_label(ok))],
        );
    }

    pub fn observe_db_operation(&self, operation: &str, seconds: f64) {
        self.observe(
            "database_operation_duration_seconds",
            &[("operation", operation)],
            seconds,
        );
    }

    // --- delivery metrics ---

    pub fn record_notification(&self, kind: &str, ok: bool) {
        self.inc(
            "notification_total",
            &[("type", kind), ("status", status_label(ok))],
        );
    }

    pub fn record_uptime_push(&self, kind: &str, ok: bool) {
        self.inc(
            "uptime_push_total",
            &[("type", kind), ("status", status_label(ok))],
        );
    }

    /// Render the registry in Prometheus text exposition format.
    #[must_use]
    pub fn render(&self) -> String {
        let counters = self.counters.lock().expect("metrics lock");
        let gauges = self.gauges.lock().expect("metrics lock");
        let summaries = self.summaries.lock().expect("metrics lock");

        let mut out = String::new();
        for desc in DESCRIPTORS {
            match desc.kind {
                MetricType::Counter | MetricType::Gauge => {
                    let map = if desc.kind == MetricType::Counter {
                        &counters
                    } else {
                        &gauges
                    };
                    let Some(series) = map.get(desc.name) else {
                        continue;
                    };
                    write_header(&mut out, desc);
                    for (label_set, value) in series {
                        let _ = writeln!(out, "{}{label_set} {value}", desc.name);
                    }
                }
                MetricType::Summary => {
                    let Some(series) = summaries.get(desc.name) else {
                        continue;
                    };
                    write_header(&mut out, desc);
                    for (label_set, value) in series {
                        let _ = writeln!(out, "{}_sum{label_set} {}", desc.name, value.sum);
                        let _ =
                            writeln!(out, "{}_count{label_set} {}", desc.name, value.count);
                    }
                }
            }
        }
        out
    }
}

fn write_header(out: &mut String, desc: &Descriptor) {
    let _ = writeln!(out, "# HELP {} {}", desc.name, desc.help);
    let _ = writeln!(out, "# TYPE {} {}", desc.name, desc.kind.as_str());
}

const fn status_label(ok: bool) -> &'static str {
    if ok { "success" } else { "error" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_renders_nothing() {
        let metrics = Metrics::new();
        assert!(metrics.render().is_empty());
    }

    #[test]
    fn counters_accumulate() {
        let metrics = Metrics::new();
        metrics.record_model_test(1, "main", "gpt-4o", "success");
        metrics.record_model_test(1, "main", "gpt-4o", "success");
        metrics.record_model_test(1, "main", "gpt-4o", "failed");

        let text = metrics.render();
        assert!(text.contains("# TYPE model_test_total counter"));
        assert!(text.contains(
            "model_test_total{channel_id=\"1\",channel_name=\"main\",model=\"gpt-4o\",status=\"success\"} 2"
        ));
        assert!(text.contains(
            "model_test_total{channel_id=\"1\",channel_name=\"main\",model=\"gpt-4o\",status=\"failed\"} 1"
        ));
    }

    #[test]
    fn gauges_overwrite() {
        let metrics = Metrics::new();
        metrics.set_active_channels(3);
        metrics.set_active_channels(7);
        assert!(metrics.render().contains("active_channels_total 7"));
    }

    #[test]
    fn summaries_track_sum_and_count() {
        let metrics = Metrics::new();
        metrics.record_cycle(1.5);
        metrics.record_cycle(2.5);
        let text = metrics.render();
        assert!(text.contains("test_cycle_duration_seconds_sum 4"));
        assert!(text.contains("test_cycle_duration_seconds_count 2"));
        assert!(text.contains("test_cycle_total 2"));
    }

    #[test]
    fn label_values_are_escaped() {
        let metrics = Metrics::new();
        metrics.record_channel_test(1, "quo\"ted", "success");
        assert!(metrics.render().contains("channel_name=\"quo\\\"ted\""));
    }
}
