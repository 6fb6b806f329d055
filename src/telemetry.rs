//! Metric registration for the rendering pipeline.

use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Register metric descriptions with the installed recorder. Safe to call
/// repeatedly; descriptions are emitted once per process.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "texweave_render_total",
            Unit::Count,
            "Total number of successful engine renders."
        );
        describe_counter!(
            "texweave_render_error_total",
            Unit::Count,
            "Total number of renders rejected by the engine."
        );
        describe_counter!(
            "texweave_lock_timeout_total",
            Unit::Count,
            "Total number of renders rejected because no engine slot was locked in time."
        );
        describe_histogram!(
            "texweave_render_ms",
            Unit::Milliseconds,
            "Engine render latency in milliseconds."
        );
    });
}
