/// Errors raised by the control-plane adapters: reconciler-level (read
/// or write against the watched custom resources / global webhook
/// fails).
#[derive(Debug)]
pub enum ControlPlaneError {
    NotFound(String),
    Conflict(String),
    Unavailable(Box<dyn std::error::Error + Send + Sync>),
    Other(String),
}

impl ControlPlaneError {
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        ControlPlaneError::Unavailable(Box::new(err))
    }
}

impl std::fmt::Display for ControlPlaneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlPlaneError::NotFound(msg) => write!(f, "not found: {msg}"),
            ControlPlaneError::Conflict(msg) => write!(f, "conflict: {msg}"),
            ControlPlaneError::Unavailable(err) => write!(f, "control plane unavailable: {err}"),
            ControlPlaneError::Other(msg) => write!(f, "control plane error: {msg}"),
        }
    }
}

impl std::error::Error for ControlPlaneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControlPlaneError::Unavailable(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
