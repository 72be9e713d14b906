use crate::state::ProxyState;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};
use bytes::Bytes;
use gesher_dispatcher::{dispatch, DispatchResult};
use gesher_types::{AdmissionResponse, AdmissionReview};
use std::sync::Arc;
use tracing::warn;

/// `POST /proxy`: decode the inbound `AdmissionReview`, resolve the
/// matching downstream endpoints via `RuleIndex::get`, dispatch, and
/// encode the response. A wrong-content-type request returns a decoded
/// `400` error rather than being silently dropped.
pub async fn proxy_handler(
    State(state): State<Arc<ProxyState>>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    if !has_json_content_type(&headers) {
        warn!("rejected admission request with unsupported content-type");
        return bad_request("unsupported content-type, expected application/json");
    }

    let review: AdmissionReview = match serde_json::from_slice(&body) {
        Ok(review) => review,
        Err(err) => {
            warn!(%err, "could not decode admission review");
            return bad_request(&format!("could not decode admission review: {err}"));
        }
    };

    let Some(request) = review.request.clone() else {
        warn!("admission review carried no request");
        return bad_request("admission review carried no request");
    };

    // Cluster-scoped requests carry no namespace; no Rule resource is
    // ever registered against one, so this never matches and the
    // request allows on an empty endpoint set.
    let namespace = request.namespace.clone().unwrap_or_default();
    let endpoints = state.rule_index.get(
        &namespace,
        &request.resource.group,
        &request.resource.version,
        &request.resource.resource,
        request.operation,
    );

    let verdict = dispatch(&endpoints, body.clone(), headers.clone()).await;

    let response = match verdict {
        DispatchResult::Allow => AdmissionResponse::allow(request.uid.clone()),
        DispatchResult::Deny(message) => AdmissionResponse::deny(request.uid.clone(), message),
    };

    Json(review.respond(response)).into_response()
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

fn bad_request(message: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

/// `GET /healthz`: liveness — always 200 once the process is serving.
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// `GET /readyz`: readiness — 200 once the rule index handle exists,
/// which is true for the whole lifetime of a constructed `ProxyState`.
/// Kept as its own endpoint (rather than folded into `healthz`) so a
/// future readiness dependency (e.g. "has completed at least one
/// reconcile") has a seam to plug into.
pub async fn readyz(State(_state): State<Arc<ProxyState>>) -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
