//! The Dispatcher. Fans a single admission review out to every matched
//! downstream endpoint in parallel and aggregates the results into a
//! single allow/deny verdict.

mod error;

pub use error::DispatchError;

use bytes::Bytes;
use gesher_types::{FailurePolicy, ResolvedEndpoint};
use http::HeaderMap;
use std::time::Duration;
use tracing::warn;

/// The dispatcher's verdict: a message is attached only on `Deny`, and
/// is the human-readable reason surfaced to the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Allow,
    Deny(String),
}

/// Fan out `body` to every endpoint, in parallel, and aggregate.
///
/// An empty endpoint list allows immediately. Every task runs to
/// completion regardless of earlier denials — no early cancel on first
/// deny; the first denial by endpoint order is surfaced. Merging every
/// denial into one message rather than surfacing just the first is a
/// reasonable future enhancement, not something this aggregation
/// commits to today.
pub async fn dispatch(
    endpoints: &[ResolvedEndpoint],
    body: Bytes,
    headers: HeaderMap,
) -> DispatchResult {
    if endpoints.is_empty() {
        return DispatchResult::Allow;
    }

    let (tx, mut rx) = tokio::sync::mpsc::channel::<(usize, Option<String>)>(endpoints.len());

    for (index, endpoint) in endpoints.iter().cloned().enumerate() {
        let tx = tx.clone();
        let body = body.clone();
        let headers = headers.clone();
        tokio::spawn(async move {
            let outcome = call_endpoint(&endpoint, body, headers).await;
            let _ = tx.send((index, outcome)).await;
        });
    }
    drop(tx);

    let mut denials: Vec<Option<String>> = vec![None; endpoints.len()];
    let mut remaining = endpoints.len();
    while remaining > 0 {
        match rx.recv().await {
            Some((index, outcome)) => {
                denials[index] = outcome;
                remaining -= 1;
            }
            None => break,
        }
    }

    match denials.into_iter().flatten().next() {
        Some(message) => DispatchResult::Deny(message),
        None => DispatchResult::Allow,
    }
}

/// Call one endpoint and return `Some(message)` if the request must be
/// denied because of it, `None` if it allowed (or its failure policy
/// absorbed a transport error).
async fn call_endpoint(
    endpoint: &ResolvedEndpoint,
    body: Bytes,
    headers: HeaderMap,
) -> Option<String> {
    let client = match build_client(endpoint) {
        Ok(client) => client,
        Err(err) => return map_failure(endpoint, err),
    };
    let url = endpoint.client_config.target_url();
    send_and_interpret(&client, &url, body, &headers, &endpoint.webhook_name, endpoint.failure_policy).await
}

/// Protocol logic, isolated from TLS/client construction so it can be
/// exercised against a plain-HTTP mock downstream in tests.
async fn send_and_interpret(
    client: &reqwest::Client,
    url: &str,
    body: Bytes,
    headers: &HeaderMap,
    webhook_name: &str,
    failure_policy: FailurePolicy,
) -> Option<String> {
    let mut request = client.post(url).body(body);
    for (name, value) in headers.iter() {
        if name == http::header::HOST || name == http::header::CONTENT_LENGTH || name == http::header::CONTENT_TYPE {
            continue;
        }
        request = request.header(name, value);
    }
    request = request.header(http::header::CONTENT_TYPE, "application/json");

    let response = match request.send().await {
        Ok(resp) => resp,
        Err(err) => {
            return map_failure_with(webhook_name, failure_policy, DispatchError::Transport(err.to_string()));
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        return map_failure_with(
            webhook_name,
            failure_policy,
            DispatchError::Transport(format!("downstream returned status {status}")),
        );
    }

    let raw = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            return map_failure_with(webhook_name, failure_policy, DispatchError::Transport(err.to_string()));
        }
    };

    let review: gesher_types::AdmissionReview = match serde_json::from_slice(&raw) {
        Ok(review) => review,
        Err(err) => {
            return map_failure_with(
                webhook_name,
                failure_policy,
                DispatchError::Decode(format!("could not decode downstream response: {err}")),
            );
        }
    };

    match review.response {
        Some(resp) if !resp.allowed => {
            let message = resp
                .result
                .map(|r| r.message)
                .unwrap_or_else(|| "no reason given".to_string());
            Some(format!("proxied webhook {webhook_name} denied the request: {message}"))
        }
        Some(_) => None,
        None => map_failure_with(
            webhook_name,
            failure_policy,
            DispatchError::Decode("downstream response carried no `response` field".to_string()),
        ),
    }
}

fn build_client(endpoint: &ResolvedEndpoint) -> Result<reqwest::Client, DispatchError> {
    let cert = reqwest::Certificate::from_pem(&endpoint.ca_bundle)
        .map_err(|err| DispatchError::Transport(format!("invalid CA bundle: {err}")))?;
    reqwest::Client::builder()
        .add_root_certificate(cert)
        .tls_built_in_root_certs(false)
        .timeout(Duration::from_secs(endpoint.timeout_seconds as u64))
        .build()
        .map_err(|err| DispatchError::Transport(format!("could not build https client: {err}")))
}

fn map_failure(endpoint: &ResolvedEndpoint, err: DispatchError) -> Option<String> {
    map_failure_with(&endpoint.webhook_name, endpoint.failure_policy, err)
}

/// Failure-policy mapper: `Fail` surfaces the error as a denial,
/// `Ignore` treats the endpoint as if it had allowed.
fn map_failure_with(webhook_name: &str, policy: FailurePolicy, err: DispatchError) -> Option<String> {
    match policy {
        FailurePolicy::Fail => Some(format!("proxied webhook {webhook_name} failed: {err}")),
        FailurePolicy::Ignore => {
            warn!(webhook = %webhook_name, %err, "ignoring transport failure per failure policy");
            None
        }
    }
}
