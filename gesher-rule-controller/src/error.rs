use gesher_controlplane::ControlPlaneError;

/// Reconciler-level errors, returned so the caller's work-queue
/// requeues with backoff.
#[derive(Debug)]
pub enum ReconcileError {
    ControlPlane(ControlPlaneError),
}

impl From<ControlPlaneError> for ReconcileError {
    fn from(err: ControlPlaneError) -> Self {
        ReconcileError::ControlPlane(err)
    }
}

impl std::fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileError::ControlPlane(err) => write!(f, "rule reconcile failed: {err}"),
        }
    }
}

impl std::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReconcileError::ControlPlane(err) => Some(err),
        }
    }
}
