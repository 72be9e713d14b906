use crate::error::ProxyError;
use crate::handler::{healthz, proxy_handler, readyz};
use crate::layers::{catch_panic_layer, default_trace};
use crate::state::ProxyState;
use axum::routing::{get, post};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/proxy", post(proxy_handler))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(state)
        .layer(catch_panic_layer())
        .layer(default_trace())
}

/// Load a `RustlsConfig` from the operator's own serving certificate
/// and key, mirroring `echo-session-ws-gateway`'s `load_tls` helper.
pub async fn load_tls_config(cert_pem: &[u8], key_pem: &[u8]) -> Result<RustlsConfig, ProxyError> {
    RustlsConfig::from_pem(cert_pem.to_vec(), key_pem.to_vec())
        .await
        .map_err(|err| ProxyError::Tls(err.to_string()))
}

/// Bind and serve the admission proxy over HTTPS until `shutdown`
/// resolves, then let in-flight requests drain. Graceful shutdown
/// mirrors `r2e_core::AppBuilder::serve`.
pub async fn serve(
    addr: SocketAddr,
    tls_config: RustlsConfig,
    state: Arc<ProxyState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), ProxyError> {
    let app = router(state);
    let handle = Handle::new();

    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        shutdown.await;
        shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(30)));
    });

    info!(%addr, "gesher proxy listening");
    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|err| ProxyError::Bind(err.to_string()))?;

    info!("gesher proxy stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use gesher_rule_index::RuleIndexHandle;
    use http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn healthz_returns_ok() {
        let state = Arc::new(ProxyState::new(RuleIndexHandle::new()));
        let app = router(state);
        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
    }
}
