use crate::types::TaskId;
use thiserror::Error;
use tracing::{error, warn};

/// Severity attached to a reported anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Recoverable; the graph keeps draining.
    Warning,
    /// Unexpected state that still does not abort the step.
    Error,
}

/// Recoverable scheduling anomalies.
///
/// Nothing here is fatal: every variant is reported through the
/// [`ErrorSink`] and the resolution engine continues to make forward progress
/// on the rest of the graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Anomaly {
    /// A slot that already completed reached zero readiness again, typically
    /// through a stray manual reference pair. The dispatch is skipped; its
    /// dependents were already released the first time around.
    #[error("task {0:?} dispatched twice")]
    DoubleDispatch(TaskId),
    /// A GPU task became ready with no GPU dispatcher configured. The slot
    /// fails open: its dependents are resolved without the work executing.
    #[error("no GPU dispatcher configured for GPU task {0:?}")]
    MissingGpuDispatcher(TaskId),
}

/// Diagnostic sink consumed by the scheduler for anomaly reporting.
pub trait ErrorSink: Send + Sync {
    /// Report one anomaly. May be called from any thread that drives the
    /// run-phase entry points.
    fn report(&self, severity: Severity, anomaly: &Anomaly);
}

/// Default sink that routes anomalies to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, severity: Severity, anomaly: &Anomaly) {
        match severity {
            Severity::Warning => warn!(%anomaly, "scheduler anomaly"),
            Severity::Error => error!(%anomaly, "scheduler anomaly"),
        }
    }
}
