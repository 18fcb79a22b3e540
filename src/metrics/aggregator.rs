use super::sample::{MetricKey, MetricSample};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Ordered samples for one (source, kind) key, in arrival order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricSeries {
    samples: Vec<MetricSample>,
}

impl MetricSeries {
    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recently received sample value
    pub fn latest(&self) -> Option<f64> {
        self.samples.last().map(|s| s.value)
    }

    /// Arithmetic mean of all values
    pub fn mean(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        let sum: f64 = self.samples.iter().map(|s| s.value).sum();
        Some(sum / self.samples.len() as f64)
    }

    pub fn min(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.value).reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.value).reduce(f64::max)
    }

    pub fn summary(&self) -> Option<SeriesSummary> {
        Some(SeriesSummary {
            count: self.len(),
            latest: self.latest()?,
            mean: self.mean()?,
            min: self.min()?,
            max: self.max()?,
        })
    }

    fn push(&mut self, sample: MetricSample) {
        self.samples.push(sample);
    }
}

/// Derived statistics over one series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Number of samples received
    pub count: usize,

    /// Value of the last sample received
    pub latest: f64,

    /// Arithmetic mean
    pub mean: f64,

    pub min: f64,
    pub max: f64,
}

/// Accumulates pipeline telemetry for a single call
///
/// One instance is bound per session attempt. Malformed samples are dropped
/// so telemetry can never disrupt the call.
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    series: HashMap<MetricKey, MetricSeries>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample, creating its series on first use
    pub fn add_stat(&mut self, sample: MetricSample) {
        if !sample.is_well_formed() {
            debug!(
                "Dropping malformed metric sample (source={:?}, kind={:?}, value={})",
                sample.source, sample.kind, sample.value
            );
            return;
        }

        self.series.entry(sample.key()).or_default().push(sample);
    }

    /// Known keys, sorted by (source, kind)
    pub fn keys(&self) -> Vec<MetricKey> {
        let mut keys: Vec<MetricKey> = self.series.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Distinct sources that have reported at least one sample
    pub fn sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = self.series.keys().map(|k| k.source.clone()).collect();
        sources.sort();
        sources.dedup();
        sources
    }

    pub fn series(&self, key: &MetricKey) -> Option<&MetricSeries> {
        self.series.get(key)
    }

    /// Samples for a key in arrival order; empty if the key is unknown
    pub fn samples(&self, key: &MetricKey) -> &[MetricSample] {
        self.series.get(key).map(MetricSeries::samples).unwrap_or(&[])
    }

    pub fn summary(&self, key: &MetricKey) -> Option<SeriesSummary> {
        self.series.get(key).and_then(MetricSeries::summary)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Discard every series
    pub fn reset(&mut self) {
        self.series.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::TTFB;

    #[test]
    fn test_series_created_lazily() {
        let mut agg = MetricsAggregator::new();
        assert!(agg.is_empty());

        agg.add_stat(MetricSample::new("tts", TTFB, 42.0, 1));

        assert_eq!(agg.len(), 1);
        assert_eq!(agg.samples(&MetricKey::new("tts", TTFB)).len(), 1);
    }

    #[test]
    fn test_arrival_order_preserved() {
        let mut agg = MetricsAggregator::new();
        agg.add_stat(MetricSample::new("llm", TTFB, 1.0, 300));
        agg.add_stat(MetricSample::new("llm", TTFB, 2.0, 100));
        agg.add_stat(MetricSample::new("llm", TTFB, 3.0, 200));

        let values: Vec<f64> = agg
            .samples(&MetricKey::new("llm", TTFB))
            .iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_empty_key_and_nan_dropped() {
        let mut agg = MetricsAggregator::new();
        agg.add_stat(MetricSample::new("", TTFB, 1.0, 0));
        agg.add_stat(MetricSample::new("stt", "", 1.0, 0));
        agg.add_stat(MetricSample::new("stt", TTFB, f64::NAN, 0));

        assert!(agg.is_empty());
    }

    #[test]
    fn test_summary_min_max_latest() {
        let mut agg = MetricsAggregator::new();
        for (i, v) in [50.0, 10.0, 90.0, 30.0].into_iter().enumerate() {
            agg.add_stat(MetricSample::new("stt", TTFB, v, i as i64));
        }

        let summary = agg.summary(&MetricKey::new("stt", TTFB)).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.latest, 30.0);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 90.0);
        assert!((summary.mean - 45.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sources_deduplicated() {
        let mut agg = MetricsAggregator::new();
        agg.add_stat(MetricSample::new("stt", TTFB, 1.0, 0));
        agg.add_stat(MetricSample::new("stt", "processing", 1.0, 0));
        agg.add_stat(MetricSample::new("llm", TTFB, 1.0, 0));

        assert_eq!(agg.sources(), vec!["llm".to_string(), "stt".to_string()]);
        assert_eq!(agg.len(), 3);
    }

    #[test]
    fn test_unknown_key_queries() {
        let agg = MetricsAggregator::new();
        let key = MetricKey::new("nope", TTFB);

        assert!(agg.samples(&key).is_empty());
        assert!(agg.series(&key).is_none());
        assert!(agg.summary(&key).is_none());
    }
}
