use thiserror::Error;

/// Failures surfaced by the sampling engine.
///
/// `MetricsUnavailable` is fatal to one sample only; the caller shows a
/// placeholder and retries on the next tick. The per-process variants are
/// expected and frequent, and the public facade collapses them into `bool`
/// or `Option` results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("metrics unavailable: {0}")]
    MetricsUnavailable(String),
    #[error("process {0} not found")]
    ProcessNotFound(u32),
    #[error("access denied for process {0}")]
    AccessDenied(u32),
}

impl MetricsError {
    pub fn unavailable(what: impl Into<String>) -> Self {
        MetricsError::MetricsUnavailable(what.into())
    }
}
