//! Metrics instrumentation for runtime observability.

use std::time::Instant;

/// Record model request latency.
pub fn record_model_latency(duration_ms: f64) {
    metrics::histogram!("model_request_latency", duration_ms);
}

/// Record the wall time of one tool resolution round.
pub fn record_tool_round_latency(duration_ms: f64) {
    metrics::histogram!("tool_round_latency", duration_ms);
}

/// Increment executed tool round counter.
pub fn increment_tool_rounds() {
    metrics::counter!("tool_rounds_total", 1);
}

/// Increment degraded or fallback response counter.
pub fn increment_degraded_responses() {
    metrics::counter!("degraded_responses_total", 1);
}

/// RAII timer for automatic metric recording.
pub struct MetricTimer {
    start: Instant,
    metric_name: &'static str,
}

impl MetricTimer {
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }
}

impl Drop for MetricTimer {
    fn drop(&mut self) {
        let duration_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        match self.metric_name {
            "model_request_latency" => record_model_latency(duration_ms),
            "tool_round_latency" => record_tool_round_latency(duration_ms),
            _ => {}
        }
    }
}
