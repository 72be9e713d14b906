/// Transport-level failure calling one downstream endpoint: DNS,
/// connection, TLS, timeout, I/O, or a non-2xx/undecodable response.
#[derive(Debug)]
pub enum DispatchError {
    Transport(String),
    Decode(String),
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::Transport(msg) => write!(f, "{msg}"),
            DispatchError::Decode(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for DispatchError {}
