//! Client-side metrics for gateway traffic and session transitions.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the host
//! application installs a recorder.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

// === Metric Name Constants ===

/// Gateway round-trip latency metric name.
pub const METRIC_GATEWAY_LATENCY: &str = "gateway_request_latency_ms";
/// Gateway calls counter metric name.
pub const METRIC_GATEWAY_REQUESTS: &str = "gateway_requests_total";
/// Gateway failures counter metric name.
pub const METRIC_GATEWAY_FAILURES: &str = "gateway_failures_total";
/// Successful logins counter metric name.
pub const METRIC_LOGINS: &str = "session_logins_total";
/// Successful signups counter metric name.
pub const METRIC_SIGNUPS: &str = "session_signups_total";
/// Logouts counter metric name.
pub const METRIC_LOGOUTS: &str = "session_logouts_total";
/// Dashboard widgets replaced by defaults counter metric name.
pub const METRIC_DASHBOARD_FALLBACKS: &str = "dashboard_fallbacks_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_GATEWAY_LATENCY,
        "Gateway round-trip latency in milliseconds"
    );

    describe_counter!(METRIC_GATEWAY_REQUESTS, "Total number of gateway calls");
    describe_counter!(
        METRIC_GATEWAY_FAILURES,
        "Total number of failed gateway calls, by failure kind"
    );
    describe_counter!(METRIC_LOGINS, "Total number of successful logins");
    describe_counter!(METRIC_SIGNUPS, "Total number of successful signups");
    describe_counter!(METRIC_LOGOUTS, "Total number of logouts");
    describe_counter!(
        METRIC_DASHBOARD_FALLBACKS,
        "Total number of dashboard widgets that fell back to defaults"
    );

    debug!("Metrics initialized");
}

/// Record one gateway call and, if it failed, its failure kind.
pub fn record_gateway_call(start: Instant, failure: Option<&'static str>) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_GATEWAY_LATENCY).record(latency_ms);
    counter!(METRIC_GATEWAY_REQUESTS).increment(1);
    if let Some(kind) = failure {
        counter!(METRIC_GATEWAY_FAILURES, "kind" => kind).increment(1);
    }
}

/// Record a successful login.
pub fn record_login() {
    counter!(METRIC_LOGINS).increment(1);
}

/// Record a successful signup.
pub fn record_signup() {
    counter!(METRIC_SIGNUPS).increment(1);
}

/// Record a logout.
pub fn record_logout() {
    counter!(METRIC_LOGOUTS).increment(1);
}

/// Record a dashboard widget that fell back to its default.
pub fn record_dashboard_fallback(widget: &'static str) {
    counter!(METRIC_DASHBOARD_FALLBACKS, "widget" => widget).increment(1);
}
