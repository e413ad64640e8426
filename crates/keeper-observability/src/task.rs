//! Per-task scheduling metrics, labelled by task name and tick status.

use std::time::Duration;

use metrics::{counter, histogram};

/// One finished (or skipped) tick. `overrun` is how far the tick ran past
/// its interval, if at all.
pub fn record_tick(
    task: &'static str,
    status: &'static str,
    duration: Duration,
    overrun: Option<Duration>,
) {
    counter!("keeper_task_runs_total", "task" => task, "status" => status).increment(1);
    histogram!("keeper_task_duration_seconds", "task" => task, "status" => status)
        .record(duration.as_secs_f64());

    if let Some(overrun) = overrun {
        counter!("keeper_task_overruns_total", "task" => task).increment(1);
        histogram!("keeper_task_overrun_seconds", "task" => task).record(overrun.as_secs_f64());
    }
}

/// Delay until the task's next tick, jitter included.
pub fn record_task_cadence(task: &'static str, cadence: Duration) {
    histogram!("keeper_task_cadence_seconds", "task" => task).record(cadence.as_secs_f64());
}
