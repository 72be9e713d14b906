/// Startup-level failures for the proxy's HTTPS listener: fatal,
/// the process exits non-zero.
#[derive(Debug)]
pub enum ProxyError {
    Tls(String),
    Bind(String),
}

impl std::fmt::Display for ProxyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProxyError::Tls(msg) => write!(f, "could not load TLS material: {msg}"),
            ProxyError::Bind(msg) => write!(f, "could not bind proxy listener: {msg}"),
        }
    }
}

impl std::error::Error for ProxyError {}
