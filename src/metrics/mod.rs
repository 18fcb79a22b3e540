//! Pipeline latency telemetry
//!
//! This module provides the `MetricsAggregator` that collects samples emitted
//! by the agent pipeline during a call:
//! - Samples keyed by (source, kind), kinds are open-ended
//! - Per-key series kept in arrival order
//! - Summary statistics computed on demand for display

mod aggregator;
mod sample;

pub use aggregator::{MetricSeries, MetricsAggregator, SeriesSummary};
pub use sample::{MetricKey, MetricSample, TTFB};
