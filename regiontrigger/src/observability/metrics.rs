//! Metrics collection.
//!
//! Prometheus-compatible metrics with typed convenience functions. Every
//! label value is drawn from a fixed set; region and participant names are
//! never used as labels.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::RegionTriggerError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Direction of a region transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Enter effects ran
    Enter,
    /// Leave effects ran
    Leave,
}

impl TransitionKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Leave => "leave",
        }
    }
}

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// # Errors
///
/// Returns `RegionTriggerError::Io` if the recorder or HTTP listener
/// cannot be installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), RegionTriggerError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| RegionTriggerError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "regiontrigger_region_transitions_total",
        "Region enter and leave transitions"
    );
    describe_counter!(
        "regiontrigger_denials_total",
        "Actions vetoed by region policy"
    );
    describe_counter!(
        "regiontrigger_policy_writes_total",
        "Policy store writes by outcome"
    );
    describe_gauge!(
        "regiontrigger_participants_tracked",
        "Participants with region state"
    );
    describe_histogram!(
        "regiontrigger_tick_duration_ms",
        "Duration of one transition tick in milliseconds"
    );
}

/// Records a region transition.
pub fn record_transition(kind: TransitionKind) {
    counter!("regiontrigger_region_transitions_total", "kind" => kind.label()).increment(1);
}

/// Records a vetoed action. `action` is one of the gate's fixed action labels.
pub fn record_denial(action: &'static str) {
    counter!("regiontrigger_denials_total", "action" => action).increment(1);
}

/// Records a policy store write.
pub fn record_policy_write(success: bool) {
    let status = if success { "success" } else { "error" };
    counter!("regiontrigger_policy_writes_total", "status" => status).increment(1);
}

/// Sets the number of participants with tracked region state.
#[allow(clippy::cast_precision_loss)]
pub fn set_participants_tracked(count: usize) {
    gauge!("regiontrigger_participants_tracked").set(count as f64);
}

/// Records how long one tick took.
pub fn record_tick_duration(duration: Duration) {
    histogram!("regiontrigger_tick_duration_ms").record(duration.as_secs_f64() * 1000.0);
}
