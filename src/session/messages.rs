use crate::metrics::{MetricSample, TTFB};
use serde_json::Value;
use tracing::debug;

/// Telemetry batch emitted by the agent pipeline
pub const METRICS_MESSAGE: &str = "pipecat-metrics";

/// Product data for the presentation layer
pub const PRODUCT_MESSAGE: &str = "rtvi-product-message";

/// Application message received from the room, dispatched on its `type` tag
#[derive(Debug, Clone, PartialEq)]
pub enum AppMessage {
    /// `{ "type": "pipecat-metrics", "metrics": { "ttfb": [...] } }`
    Metrics(MetricsBatch),

    /// Forwarded unchanged to presentation
    Product(Value),

    /// Unknown or missing tag; ignored
    Unrecognized(Option<String>),
}

impl AppMessage {
    pub fn parse(message: &Value) -> Self {
        match message.get("type").and_then(Value::as_str) {
            Some(METRICS_MESSAGE) => AppMessage::Metrics(MetricsBatch::from_payload(message)),
            Some(PRODUCT_MESSAGE) => AppMessage::Product(message.clone()),
            other => AppMessage::Unrecognized(other.map(str::to_string)),
        }
    }
}

/// One ttfb entry: `{ "processor": ..., "value": ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct TtfbEntry {
    pub processor: String,
    pub value: f64,
}

/// Well-formed ttfb entries of a telemetry message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsBatch {
    pub ttfb: Vec<TtfbEntry>,
}

impl MetricsBatch {
    /// Extract ttfb entries, skipping any that are malformed
    pub fn from_payload(message: &Value) -> Self {
        let entries = message
            .get("metrics")
            .and_then(|m| m.get(TTFB))
            .and_then(Value::as_array);

        let Some(entries) = entries else {
            return Self::default();
        };

        let ttfb = entries
            .iter()
            .filter_map(|entry| {
                let processor = entry.get("processor").and_then(Value::as_str);
                let value = entry.get("value").and_then(Value::as_f64);
                match (processor, value) {
                    (Some(processor), Some(value)) => Some(TtfbEntry {
                        processor: processor.to_string(),
                        value,
                    }),
                    _ => {
                        debug!("Skipping malformed ttfb entry: {}", entry);
                        None
                    }
                }
            })
            .collect();

        Self { ttfb }
    }

    /// One sample per entry, stamped with the processing time
    pub fn samples(&self, observed_at_millis: i64) -> Vec<MetricSample> {
        self.ttfb
            .iter()
            .map(|e| MetricSample::new(e.processor.clone(), TTFB, e.value, observed_at_millis))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ttfb.is_empty()
    }
}
