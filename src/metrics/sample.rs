use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric kind for time-to-first-byte measurements
pub const TTFB: &str = "ttfb";

/// A single timestamped measurement from a pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Emitting pipeline stage (e.g. "stt", "llm", "tts")
    pub source: String,

    /// Measurement kind (e.g. "ttfb")
    pub kind: String,

    /// Measured value
    pub value: f64,

    /// When the sample was recorded, in Unix milliseconds
    pub observed_at_millis: i64,
}

impl MetricSample {
    pub fn new(
        source: impl Into<String>,
        kind: impl Into<String>,
        value: f64,
        observed_at_millis: i64,
    ) -> Self {
        Self {
            source: source.into(),
            kind: kind.into(),
            value,
            observed_at_millis,
        }
    }

    /// Build a sample stamped with the current time
    pub fn observed_now(source: impl Into<String>, kind: impl Into<String>, value: f64) -> Self {
        Self::new(source, kind, value, chrono::Utc::now().timestamp_millis())
    }

    /// Whether the sample can be recorded (non-empty key, finite value)
    pub fn is_well_formed(&self) -> bool {
        !self.source.is_empty() && !self.kind.is_empty() && self.value.is_finite()
    }

    pub fn key(&self) -> MetricKey {
        MetricKey::new(self.source.clone(), self.kind.clone())
    }
}

/// Series identifier: which stage measured what
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricKey {
    pub source: String,
    pub kind: String,
}

impl MetricKey {
    pub fn new(source: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.kind)
    }
}
