use crate::RuleIndex;
use gesher_types::{Operation, ResolvedEndpoint, RuleResource};
use std::sync::{Arc, RwLock};

/// The single mutable root pointer fronting an otherwise-immutable
/// [`RuleIndex`]: one writer swaps the `Arc` under a short-lived write
/// lock, any number of readers clone the `Arc` under a short-lived read
/// lock and then read the snapshot lock-free. `r2e-security`'s JWKS
/// cache uses the same swap-the-whole-`Arc` shape over
/// `tokio::sync::RwLock`, but the writer here is synchronous, so
/// `std::sync::RwLock` is enough.
#[derive(Debug, Clone)]
pub struct RuleIndexHandle {
    inner: Arc<RwLock<Arc<RuleIndex>>>,
}

impl Default for RuleIndexHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleIndexHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(RuleIndex::new()))),
        }
    }

    /// Acquire the current snapshot without blocking any writer for
    /// longer than it takes to clone an `Arc`.
    pub fn snapshot(&self) -> Arc<RuleIndex> {
        self.inner
            .read()
            .expect("rule index lock poisoned")
            .clone()
    }

    pub fn get(
        &self,
        namespace: &str,
        group: &str,
        version: &str,
        resource: &str,
        operation: Operation,
    ) -> Vec<ResolvedEndpoint> {
        self.snapshot()
            .get(namespace, group, version, resource, operation)
    }

    pub fn add(&self, rule: &RuleResource) {
        self.replace(|idx| idx.add(rule));
    }

    pub fn delete(&self, rule: &RuleResource) {
        self.replace(|idx| idx.delete(rule));
    }

    pub fn update(&self, rule: &RuleResource) {
        self.replace(|idx| idx.update(rule));
    }

    fn replace(&self, f: impl FnOnce(&RuleIndex) -> RuleIndex) {
        let mut guard = self.inner.write().expect("rule index lock poisoned");
        let next = f(&guard);
        *guard = Arc::new(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesher_types::{
        ClientConfig, FailurePolicy, InterestingTuple, ResourceMeta, RuleResource, RuleSpec,
        Scope, WebhookEntry,
    };

    fn rule(uid: &str, namespace: &str) -> RuleResource {
        RuleResource {
            metadata: ResourceMeta {
                name: format!("rule-{uid}"),
                namespace: Some(namespace.to_string()),
                uid: uid.to_string(),
                generation: 1,
                deletion_timestamp: None,
                finalizers: vec![],
            },
            spec: RuleSpec {
                webhooks: vec![WebhookEntry {
                    name: "wh1".into(),
                    client_config: ClientConfig::Service {
                        namespace: String::new(),
                        name: "downstream".into(),
                        port: None,
                        path: None,
                    },
                    ca_bundle: vec![],
                    rules: vec![InterestingTuple::new(
                        "",
                        "v1",
                        "namespaces",
                        Operation::Create,
                        Scope::Namespaced,
                    )],
                    failure_policy: FailurePolicy::Fail,
                    timeout_seconds: 30,
                    side_effects: None,
                    review_versions: vec![],
                }],
            },
            status: Default::default(),
        }
    }

    #[test]
    fn add_is_visible_to_subsequent_get() {
        let handle = RuleIndexHandle::new();
        handle.add(&rule("u1", "ns"));
        let got = handle.get("ns", "", "v1", "namespaces", Operation::Create);
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn snapshot_taken_before_a_write_is_unaffected_by_it() {
        let handle = RuleIndexHandle::new();
        let before = handle.snapshot();
        handle.add(&rule("u1", "ns"));
        assert!(before.is_empty());
        assert!(!handle.snapshot().is_empty());
    }

    #[test]
    fn delete_removes_previously_added_rule() {
        let handle = RuleIndexHandle::new();
        let r = rule("u1", "ns");
        handle.add(&r);
        handle.delete(&r);
        assert!(handle.get("ns", "", "v1", "namespaces", Operation::Create).is_empty());
    }
}
