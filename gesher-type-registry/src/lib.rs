//! Component B: the process-wide union of "interesting tuples"
//! declared across every Type custom resource, and the derivation of
//! the desired global webhook rule list from that union.
//!
//! Structurally this mirrors [`gesher_rule_index::RuleIndex`] — same
//! nested-map cascade, same clone-on-write value semantics — except
//! there is no namespace dimension (Type is cluster-scoped) and each
//! leaf is a presence set rather than a list of resolved endpoints.

mod handle;

pub use handle::TypeRegistryHandle;

use gesher_types::{Operation, RuleWithOperations, Scope, TypeResource, WILDCARD};
use std::collections::{HashMap, HashSet};
use tracing::warn;

type InstanceSet = HashSet<String>;
type OpMap = HashMap<Operation, InstanceSet>;
type ResourceMap = HashMap<String, OpMap>;
type VersionMap = HashMap<String, ResourceMap>;
type GroupMap = HashMap<String, VersionMap>;

/// An immutable snapshot of the merged interesting-tuple set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    groups: GroupMap,
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

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a new snapshot with an `instanceId` presence mark added
    /// at every `(group, version, resource, operation)` cell named by
    /// `resource.spec.tuples`.
    pub fn add(&self, resource: &TypeResource) -> Self {
        let mut next = self.clone();
        let instance_id = resource.metadata.uid.clone();
        for tuple in &resource.spec.tuples {
            if !tuple.is_well_formed() {
                warn!(
                    type_name = %resource.metadata.name,
                    resource = %tuple.resource,
                    "skipping malformed interesting tuple (blank resource name)"
                );
                continue;
            }
            next.groups
                .entry(tuple.group.clone())
                .or_default()
                .entry(tuple.version.clone())
                .or_default()
                .entry(tuple.resource.clone())
                .or_default()
                .entry(tuple.operation)
                .or_default()
                .insert(instance_id.clone());
        }
        next
    }

    /// Return a new snapshot with every presence mark for `resource`'s
    /// instance id removed, pruning any branch left empty.
    pub fn delete(&self, resource: &TypeResource) -> Self {
        let mut next = self.clone();
        let instance_id = resource.metadata.uid.as_str();
        next.groups.retain(|_, version_map| {
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
        next
    }

    pub fn update(&self, resource: &TypeResource) -> Self {
        self.delete(resource).add(resource)
    }

    /// Walk the wildcard cascade identically to `RuleIndex::get`,
    /// short-circuiting true on the first non-empty leaf encountered.
    pub fn exist(&self, group: &str, version: &str, resource: &str, operation: Operation) -> bool {
        for g in candidates(group) {
            let Some(version_map) = self.groups.get(g) else {
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
                        if op_map.get(&op).is_some_and(|set| !set.is_empty()) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Produce the desired rule list for the global webhook: one entry
    /// per stored `(group, version, resource)` path with a non-empty
    /// operation set. Order is stable so that repeated calls over an
    /// unchanged registry compare equal.
    pub fn enumerate_rules(&self) -> Vec<RuleWithOperations> {
        let mut out = Vec::new();
        for (group, version_map) in &self.groups {
            for (version, resource_map) in version_map {
                for (resource, op_map) in resource_map {
                    let mut operations: Vec<Operation> = op_map
                        .iter()
                        .filter(|(_, instances)| !instances.is_empty())
                        .map(|(op, _)| *op)
                        .collect();
                    if operations.is_empty() {
                        continue;
                    }
                    operations.sort();
                    out.push(RuleWithOperations {
                        group: group.clone(),
                        version: version.clone(),
                        resource: resource.clone(),
                        operations,
                        scope: Scope::Namespaced,
                    });
                }
            }
        }
        out.sort_by(|a, b| (&a.group, &a.version, &a.resource).cmp(&(&b.group, &b.version, &b.resource)));
        out
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesher_types::{InterestingTuple, ResourceMeta, TypeSpec};

    fn type_resource(uid: &str, tuples: Vec<InterestingTuple>) -> TypeResource {
        TypeResource {
            metadata: ResourceMeta {
                name: format!("type-{uid}"),
                namespace: None,
                uid: uid.to_string(),
                generation: 1,
                deletion_timestamp: None,
                finalizers: vec![],
            },
            spec: TypeSpec { tuples },
            status: Default::default(),
        }
    }

    fn namespaces(op: Operation) -> InterestingTuple {
        InterestingTuple::new("", "v1", "namespaces", op, Scope::Namespaced)
    }

    #[test]
    fn exist_is_false_on_empty_registry() {
        let reg = TypeRegistry::new();
        assert!(!reg.exist("", "v1", "namespaces", Operation::Create));
    }

    #[test]
    fn add_makes_exist_true() {
        let reg = TypeRegistry::new().add(&type_resource("t1", vec![namespaces(Operation::Create)]));
        assert!(reg.exist("", "v1", "namespaces", Operation::Create));
        assert!(!reg.exist("", "v1", "namespaces", Operation::Delete));
    }

    #[test]
    fn wildcard_group_short_circuits_exist() {
        let reg = TypeRegistry::new().add(&type_resource(
            "t1",
            vec![InterestingTuple::new(
                "*",
                "v1",
                "pods",
                Operation::Create,
                Scope::Namespaced,
            )],
        ));
        assert!(reg.exist("apps", "v1", "pods", Operation::Create));
    }

    #[test]
    fn type_add_remove_drives_enumerate_rules() {
        let t1 = type_resource("t1", vec![namespaces(Operation::Create)]);
        let t2 = type_resource("t2", vec![namespaces(Operation::Delete)]);

        let reg = TypeRegistry::new().add(&t1).add(&t2);
        let rules = reg.enumerate_rules();
        assert_eq!(rules.len(), 1);
        let mut ops = rules[0].operations.clone();
        ops.sort();
        assert_eq!(ops, vec![Operation::Create, Operation::Delete]);

        let reg = reg.delete(&t1);
        let rules = reg.enumerate_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].operations, vec![Operation::Delete]);

        let reg = reg.delete(&t2);
        assert!(reg.enumerate_rules().is_empty());
        assert!(reg.is_empty());
    }

    #[test]
    fn repeated_update_is_idempotent() {
        let t1 = type_resource("t1", vec![namespaces(Operation::Create)]);
        let once = TypeRegistry::new().update(&t1);
        let twice = once.update(&t1);
        assert_eq!(once, twice);
    }

    #[test]
    fn add_then_delete_restores_empty_registry() {
        let start = TypeRegistry::new();
        let t1 = type_resource("t1", vec![namespaces(Operation::Create)]);
        assert_eq!(start, start.add(&t1).delete(&t1));
    }

    #[test]
    fn malformed_tuple_with_blank_resource_is_skipped() {
        let t1 = type_resource(
            "t1",
            vec![InterestingTuple::new("apps", "v1", "", Operation::Create, Scope::Namespaced)],
        );
        let reg = TypeRegistry::new().add(&t1);
        assert!(reg.is_empty());
    }
}
