use crate::client_config::{ClientConfig, FailurePolicy, DEFAULT_TIMEOUT_SECONDS};
use crate::tuple::InterestingTuple;
use serde::{Deserialize, Serialize};

/// One downstream webhook declared by a Rule custom resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEntry {
    pub name: String,
    pub client_config: ClientConfig,
    /// PEM-encoded CA bundle trusted for this endpoint's TLS certificate.
    pub ca_bundle: Vec<u8>,
    pub rules: Vec<InterestingTuple>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    #[serde(default)]
    pub side_effects: Option<String>,
    #[serde(default)]
    pub review_versions: Vec<String>,
}

fn default_timeout() -> u32 {
    DEFAULT_TIMEOUT_SECONDS
}

/// An immutable, fully-resolved record of one downstream endpoint,
/// stored at the leaves of [`gesher_rule_index`]'s nested map. Produced
/// by flattening a [`WebhookEntry`] once at `RuleIndex::add` time so
/// that lookups never need to re-derive defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEndpoint {
    pub webhook_name: String,
    pub client_config: ClientConfig,
    pub ca_bundle: Vec<u8>,
    pub failure_policy: FailurePolicy,
    pub timeout_seconds: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_entry_fills_in_defaults() {
        let json = serde_json::json!({
            "name": "acme-validator",
            "clientConfig": {"Service": {"namespace": "", "name": "downstream", "port": null, "path": null}},
            "caBundle": [],
            "rules": [],
        });
        let entry: WebhookEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.failure_policy, FailurePolicy::Fail);
        assert_eq!(entry.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
    }
}
