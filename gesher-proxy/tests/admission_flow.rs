//! End-to-end coverage of the admission path: a populated `RuleIndex`
//! routes the request to a real HTTPS downstream (this crate's own
//! dispatcher, over TLS, against the mock server in `tests/common`),
//! and the verdict it returns comes back out through `proxy_handler`.

mod common;

use axum::body::Body;
use axum::routing::post;
use axum::Router;
use bytes::Bytes;
use gesher_proxy::ProxyState;
use gesher_rule_index::RuleIndexHandle;
use gesher_types::{
    ClientConfig, FailurePolicy, InterestingTuple, Operation, ResourceMeta, RuleResource, RuleSpec,
    Scope, WebhookEntry,
};
use http::Request;
use http_body_util::BodyExt;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

fn app(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/proxy", post(gesher_proxy::proxy_handler))
        .with_state(state)
}

fn rule_pointed_at(addr: SocketAddr) -> RuleResource {
    RuleResource {
        metadata: ResourceMeta {
            name: "label-gate".into(),
            namespace: Some("tenant-a".into()),
            uid: "u1".into(),
            generation: 1,
            deletion_timestamp: None,
            finalizers: vec![],
        },
        spec: RuleSpec {
            webhooks: vec![WebhookEntry {
                name: "label-gate".into(),
                client_config: ClientConfig::Url(format!("https://{addr}/validate")),
                ca_bundle: common::TEST_CERT_PEM.as_bytes().to_vec(),
                rules: vec![InterestingTuple::new(
                    "",
                    "v1",
                    "namespaces",
                    Operation::Create,
                    Scope::Namespaced,
                )],
                failure_policy: FailurePolicy::Fail,
                timeout_seconds: 5,
                side_effects: None,
                review_versions: vec![],
            }],
        },
        status: Default::default(),
    }
}

fn admission_review_body(uid: &str, namespace: &str, labeled: bool) -> Bytes {
    let labels = if labeled {
        serde_json::json!({ "admission-allow": "true" })
    } else {
        serde_json::json!({})
    };
    let body = serde_json::json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": uid,
            "resource": { "group": "", "version": "v1", "resource": "namespaces" },
            "namespace": namespace,
            "operation": "CREATE",
            "object": { "metadata": { "labels": labels } },
        },
    });
    Bytes::from(serde_json::to_vec(&body).unwrap())
}

async fn post_review(router: &Router, body: Bytes) -> gesher_types::AdmissionReview {
    let request = Request::builder()
        .method("POST")
        .uri("/proxy")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn request_without_label_is_denied_by_the_real_downstream() {
    let addr = common::spawn_label_gated_downstream().await;
    let handle = RuleIndexHandle::new();
    handle.add(&rule_pointed_at(addr));
    let router = app(Arc::new(ProxyState::new(handle)));

    let review = post_review(&router, admission_review_body("req-1", "tenant-a", false)).await;
    let response = review.response.unwrap();
    assert!(!response.allowed);
    assert!(response.result.unwrap().message.contains("admission-allow label not set"));
}

#[tokio::test]
async fn request_with_label_is_allowed_by_the_real_downstream() {
    let addr = common::spawn_label_gated_downstream().await;
    let handle = RuleIndexHandle::new();
    handle.add(&rule_pointed_at(addr));
    let router = app(Arc::new(ProxyState::new(handle)));

    let review = post_review(&router, admission_review_body("req-2", "tenant-a", true)).await;
    let response = review.response.unwrap();
    assert!(response.allowed);
    assert_eq!(response.uid, "req-2");
}

#[tokio::test]
async fn request_outside_the_rules_namespace_skips_the_downstream_entirely() {
    let addr = common::spawn_label_gated_downstream().await;
    let handle = RuleIndexHandle::new();
    handle.add(&rule_pointed_at(addr));
    let router = app(Arc::new(ProxyState::new(handle)));

    // No rule is registered for "tenant-b", so the index resolves to
    // no endpoints and the request allows without ever reaching the
    // label-gated downstream.
    let review = post_review(&router, admission_review_body("req-3", "tenant-b", false)).await;
    let response = review.response.unwrap();
    assert!(response.allowed);
}
