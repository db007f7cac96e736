//! Counters published through the `metrics` facade

use crate::timeframe::Timeframe;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// One aggregation pass into a timeframe
    Aggregation,
    /// Cascade lookup served from the cache
    CacheHit,
    /// Observation emitted by a replay cursor
    ReplayObservation,
}

impl CounterMetric {
    /// Exported metric name
    pub fn name(&self) -> &'static str {
        match self {
            CounterMetric::Aggregation => "history_aggregations_total",
            CounterMetric::CacheHit => "history_cache_hits_total",
            CounterMetric::ReplayObservation => "history_replay_observations_total",
        }
    }
}

/// Register metric descriptions with the installed recorder
pub fn describe_metrics() {
    metrics::describe_counter!(
        CounterMetric::Aggregation.name(),
        "Aggregation passes performed by the timeframe cascade"
    );
    metrics::describe_counter!(
        CounterMetric::CacheHit.name(),
        "Cascade lookups answered from the cache"
    );
    metrics::describe_counter!(
        CounterMetric::ReplayObservation.name(),
        "Observations emitted by replay cursors"
    );
}

/// Increment a counter labelled with a timeframe
pub fn record_timeframe(metric: CounterMetric, timeframe: Timeframe) {
    metrics::counter!(metric.name(), "timeframe" => timeframe.label()).increment(1);
}

/// Increment a counter labelled with the replay variant
pub fn record_replay(variant: &'static str) {
    metrics::counter!(CounterMetric::ReplayObservation.name(), "variant" => variant).increment(1);
}
