//! Component E: ProxyHandler. The HTTPS `/proxy` endpoint admission
//! requests are routed to, plus `/healthz`/`/readyz`.

mod error;
mod handler;
mod layers;
mod server;
mod state;

pub use error::ProxyError;
pub use handler::proxy_handler;
pub use server::{load_tls_config, serve};
pub use state::ProxyState;
