use crate::operation::{Operation, Scope};
use serde::{Deserialize, Serialize};

/// The reserved wildcard token, valid at the group/version/resource
/// position of an [`InterestingTuple`].
pub const WILDCARD: &str = "*";

/// The identity of a "type rule" fragment: a (group, version, resource,
/// operation, scope) tuple. `"*"` is permitted at the group/version/resource
/// position; [`Operation::All`] is the wildcard operation.
///
/// Invariant: a tuple with a non-wildcard resource must also carry at
/// least one group and version (wildcard allowed for either, but the
/// fields themselves are always present — they are never empty strings).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterestingTuple {
    pub group: String,
    pub version: String,
    pub resource: String,
    pub operation: Operation,
    pub scope: Scope,
}

impl InterestingTuple {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        resource: impl Into<String>,
        operation: Operation,
        scope: Scope,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            resource: resource.into(),
            operation,
            scope,
        }
    }

    /// Whether this tuple satisfies the well-formedness invariant: a
    /// non-wildcard resource must name an explicit group and version. Note the core
    /// API group is itself the empty string (`""`), which is a valid,
    /// explicit value distinct from "absent" — this only rejects a
    /// blank resource name.
    pub fn is_well_formed(&self) -> bool {
        !self.resource.is_empty()
    }
}

/// One (group, version, resource) path with its admitted operation set —
/// the unit rule enumeration derives for the global webhook's rule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleWithOperations {
    pub group: String,
    pub version: String,
    pub resource: String,
    pub operations: Vec<Operation>,
    pub scope: Scope,
}
