use crate::client_config::FailurePolicy;
use crate::tuple::RuleWithOperations;
use serde::{Deserialize, Serialize};

/// Fixed name of the single cluster-scoped validating-webhook
/// registration owned by this operator.
pub const GLOBAL_WEBHOOK_NAME: &str = "gesher-proxy";

/// The full cluster-scoped `ValidatingWebhookConfiguration` as tracked
/// by this operator: a name plus `resourceVersion` (needed for
/// optimistic-concurrency updates) and exactly one webhook entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalWebhookConfiguration {
    pub name: String,
    #[serde(default)]
    pub resource_version: Option<String>,
    pub webhooks: Vec<GlobalWebhookSpec>,
}

/// The single webhook entry the synchronizer derives and keeps in
/// sync with [`crate::TypeRegistry`]'s union of interesting tuples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalWebhookSpec {
    pub name: String,
    pub client_config: ProxyClientConfig,
    pub rules: Vec<RuleWithOperations>,
    pub failure_policy: FailurePolicy,
    pub side_effects: SideEffects,
    /// Empty means "all namespaces".
    pub namespace_selector_is_empty: bool,
    pub timeout_seconds: u32,
    pub admission_review_versions: Vec<String>,
}

/// Reference to the operator's own proxy service, read from static
/// configuration at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyClientConfig {
    pub namespace: String,
    pub name: String,
    pub path: String,
    pub ca_bundle: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideEffects {
    None,
}

pub const GLOBAL_WEBHOOK_PATH: &str = "/proxy";
pub const GLOBAL_WEBHOOK_TIMEOUT_SECONDS: u32 = 30;

impl GlobalWebhookSpec {
    /// Build the desired webhook entry for the given rule list and
    /// proxy service reference: exactly one entry named `gesher-proxy`,
    /// `FailurePolicy = Fail`, `SideEffects = None`, empty namespace
    /// selector, 30s timeout, `admissionReviewVersions = {"v1"}`.
    pub fn desired(rules: Vec<RuleWithOperations>, proxy: ProxyClientConfig) -> Self {
        Self {
            name: GLOBAL_WEBHOOK_NAME.to_string(),
            client_config: proxy,
            rules,
            failure_policy: FailurePolicy::Fail,
            side_effects: SideEffects::None,
            namespace_selector_is_empty: true,
            timeout_seconds: GLOBAL_WEBHOOK_TIMEOUT_SECONDS,
            admission_review_versions: vec!["v1".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{Operation, Scope};

    fn proxy() -> ProxyClientConfig {
        ProxyClientConfig {
            namespace: "default".into(),
            name: "gesher".into(),
            path: GLOBAL_WEBHOOK_PATH.into(),
            ca_bundle: vec![1, 2, 3],
        }
    }

    #[test]
    fn desired_matches_fixed_policy() {
        let rules = vec![RuleWithOperations {
            group: "".into(),
            version: "v1".into(),
            resource: "namespaces".into(),
            operations: vec![Operation::Create],
            scope: Scope::Namespaced,
        }];
        let spec = GlobalWebhookSpec::desired(rules, proxy());
        assert_eq!(spec.name, GLOBAL_WEBHOOK_NAME);
        assert_eq!(spec.failure_policy, FailurePolicy::Fail);
        assert_eq!(spec.side_effects, SideEffects::None);
        assert!(spec.namespace_selector_is_empty);
        assert_eq!(spec.timeout_seconds, 30);
        assert_eq!(spec.admission_review_versions, vec!["v1".to_string()]);
    }
}
