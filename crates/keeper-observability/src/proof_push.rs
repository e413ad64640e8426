use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// One attempt of a pipeline stage (`fetch` or `submit`).
pub fn record_pipeline_attempt(stage: &str, status: &str, duration: Duration) {
    counter!(
        "keeper_pipeline_attempts_total",
        "stage" => stage.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "keeper_pipeline_attempt_duration_seconds",
        "stage" => stage.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
}

pub fn record_eligible_pairs(monitored: usize, eligible: usize) {
    gauge!("keeper_monitored_pairs").set(monitored as f64);
    gauge!("keeper_eligible_pairs").set(eligible as f64);
}

pub fn record_batch_submitted(batch_size: usize) {
    counter!("keeper_batches_submitted_total").increment(1);
    counter!("keeper_pairs_submitted_total").increment(batch_size as u64);
}

pub fn record_batches_dropped(count: usize) {
    counter!("keeper_batches_dropped_total").increment(count as u64);
}
