//! Counters and histograms for provider calls and sync runs.
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, histogram};
use std::time::Duration;

fn result_label(success: bool) -> &'static str {
    if success { "success" } else { "failure" }
}

/// Track a single provider request
pub fn track_provider_call(provider: &'static str, operation: &'static str, success: bool) {
    counter!("side_stats_provider_calls_total",
        "provider" => provider,
        "operation" => operation,
        "result" => result_label(success)
    )
    .increment(1);
}

/// Track one sync pass
pub fn track_sync_attempt(success: bool) {
    counter!("side_stats_sync_attempts_total", "result" => result_label(success)).increment(1);
}

/// Track a finished sync invocation, after all retries
pub fn track_sync_run(success: bool, attempts: u32, duration: Duration) {
    let result = result_label(success);
    counter!("side_stats_sync_runs_total", "result" => result).increment(1);
    histogram!("side_stats_sync_duration_seconds", "result" => result)
        .record(duration.as_secs_f64());
    histogram!("side_stats_sync_attempts_per_run").record(attempts as f64);
}
