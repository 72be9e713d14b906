//! Component A: the nested (namespace, group, version, resource,
//! operation) lookup index that resolves an admission request to the
//! set of downstream webhook configurations to call.
//!
//! [`RuleIndex`] is an immutable value: [`RuleIndex::add`],
//! [`RuleIndex::delete`], and [`RuleIndex::update`] all clone the
//! current snapshot, mutate the copy, and return it. [`handle::RuleIndexHandle`]
//! wraps the single mutable root pointer for a single-writer,
//! many-reader concurrency model.

mod handle;

pub use handle::RuleIndexHandle;

use gesher_types::{Operation, ResolvedEndpoint, RuleResource, WILDCARD};
use std::collections::HashMap;
use tracing::warn;

type OpMap = HashMap<Operation, HashMap<String, Vec<ResolvedEndpoint>>>;
type ResourceMap = HashMap<String, OpMap>;
type VersionMap = HashMap<String, ResourceMap>;
type GroupMap = HashMap<String, VersionMap>;
type NamespaceMap = HashMap<String, GroupMap>;

/// An immutable snapshot of the full rule index.
///
/// `r2e-security`'s JWKS cache and `r2e-rate-limit`'s per-key buckets
/// guard a mutable cache behind a lock; here the "cache" itself never
/// mutates in place — each write produces a whole new value. A
/// persistent (structurally-shared) map would cut write cost from
/// O(N) to O(log N); this takes the simpler whole-clone approach
/// instead and documents the tradeoff rather than hiding it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleIndex {
    namespaces: NamespaceMap,
}

fn candidates(concrete: &str) -> Vec<&str> {
    if concrete == WILDCARD {
        vec![WILDCARD]
    } else {
        vec![concrete, WILDCARD]
    }
}

fn operation_candidates(op: Operation) -> Vec<Operation> {
    if op == Operation::All {
        vec![Operation::All]
    } else {
        vec![op, Operation::All]
    }
}

impl RuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `(namespace, group, version, resource, operation)` to
    /// every endpoint reachable by stepping down the tree, trying the
    /// exact key then `"*"` at each level. The operation step also
    /// tries the reserved `ALL` operation.
    ///
    /// A missing namespace entry returns an empty `Vec` — callers must
    /// treat "no namespace" and "namespace present but empty" the same
    /// way.
    pub fn get(
        &self,
        namespace: &str,
        group: &str,
        version: &str,
        resource: &str,
        operation: Operation,
    ) -> Vec<ResolvedEndpoint> {
        let mut out = Vec::new();
        let mut seen = std::collections::HashSet::new();

        let Some(group_map) = self.namespaces.get(namespace) else {
            return out;
        };
        for g in candidates(group) {
            let Some(version_map) = group_map.get(g) else {
                continue;
            };
            for v in candidates(version) {
                let Some(resource_map) = version_map.get(v) else {
                    continue;
                };
                for r in candidates(resource) {
                    let Some(op_map) = resource_map.get(r) else {
                        continue;
                    };
                    for op in operation_candidates(operation) {
                        let Some(instances) = op_map.get(&op) else {
                            continue;
                        };
                        for (instance_id, endpoints) in instances {
                            for (idx, endpoint) in endpoints.iter().enumerate() {
                                if seen.insert((instance_id.clone(), idx)) {
                                    out.push(endpoint.clone());
                                }
                            }
                        }
                    }
                }
            }
        }
        out
    }

    /// Return a new snapshot with every `(group, version, resource, op)`
    /// cell induced by `rule.spec.webhooks[i].rules` populated with an
    /// `instanceId -> ResolvedEndpoint` entry.
    pub fn add(&self, rule: &RuleResource) -> Self {
        let mut next = self.clone();
        let owner_namespace = rule.own_namespace().to_string();
        let instance_id = rule.metadata.uid.clone();

        for webhook in &rule.spec.webhooks {
            let mut client_config = webhook.client_config.clone();
            client_config.resolve_namespace(&owner_namespace);
            let resolved = ResolvedEndpoint {
                webhook_name: webhook.name.clone(),
                client_config,
                ca_bundle: webhook.ca_bundle.clone(),
                failure_policy: webhook.failure_policy,
                timeout_seconds: webhook.timeout_seconds,
            };

            for tuple in &webhook.rules {
                if !tuple.is_well_formed() {
                    warn!(
                        webhook = %webhook.name,
                        resource = %tuple.resource,
                        "skipping malformed interesting tuple (blank resource name)"
                    );
                    continue;
                }
                next.namespaces
                    .entry(owner_namespace.clone())
                    .or_default()
                    .entry(tuple.group.clone())
                    .or_default()
                    .entry(tuple.version.clone())
                    .or_default()
                    .entry(tuple.resource.clone())
                    .or_default()
                    .entry(tuple.operation)
                    .or_default()
                    .entry(instance_id.clone())
                    .or_default()
                    .push(resolved.clone());
            }
        }

        next
    }

    /// Return a new snapshot with every entry whose instance id equals
    /// `rule.metadata.uid` removed, pruning any branch left empty.
    pub fn delete(&self, rule: &RuleResource) -> Self {
        let mut next = self.clone();
        let instance_id = rule.metadata.uid.as_str();

        next.namespaces.retain(|_, group_map| {
            group_map.retain(|_, version_map| {
                version_map.retain(|_, resource_map| {
                    resource_map.retain(|_, op_map| {
                        op_map.retain(|_, instances| {
                            instances.remove(instance_id);
                            !instances.is_empty()
                        });
                        !op_map.is_empty()
                    });
                    !resource_map.is_empty()
                });
                !version_map.is_empty()
            });
            !group_map.is_empty()
        });

        next
    }

    /// Equivalent to `delete` followed by `add`.
    pub fn update(&self, rule: &RuleResource) -> Self {
        self.delete(rule).add(rule)
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
