use crate::tuple::InterestingTuple;
use crate::webhook::WebhookEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The capability interface shared by every reconciled custom resource:
/// a name, an optional namespace, the generation the spec is at, and
/// the generation last fully reconciled.
pub trait ReconcilableResource {
    fn name(&self) -> &str;
    fn namespace(&self) -> Option<&str>;
    fn uid(&self) -> &str;
    fn generation(&self) -> i64;
    fn observed_generation(&self) -> i64;
    fn is_deleting(&self) -> bool;
    fn finalizers(&self) -> &[String];
}

/// Metadata common to both custom resource kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMeta {
    pub name: String,
    /// `None` for the cluster-scoped Type resource.
    #[serde(default)]
    pub namespace: Option<String>,
    pub uid: String,
    pub generation: i64,
    #[serde(default)]
    pub deletion_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finalizers: Vec<String>,
}

impl ResourceMeta {
    pub fn is_deleting(&self) -> bool {
        self.deletion_timestamp.is_some()
    }

    pub fn has_finalizer(&self, name: &str) -> bool {
        self.finalizers.iter().any(|f| f == name)
    }

    pub fn add_finalizer(&mut self, name: &str) {
        if !self.has_finalizer(name) {
            self.finalizers.push(name.to_string());
        }
    }

    pub fn remove_finalizer(&mut self, name: &str) {
        self.finalizers.retain(|f| f != name);
    }
}

/// Cluster-scoped Type custom resource: declares the "interesting
/// tuples" this tenant wants funneled through the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeResource {
    pub metadata: ResourceMeta,
    pub spec: TypeSpec,
    #[serde(default)]
    pub status: TypeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeSpec {
    pub tuples: Vec<InterestingTuple>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeStatus {
    pub observed_generation: i64,
}

impl ReconcilableResource for TypeResource {
    fn name(&self) -> &str {
        &self.metadata.name
    }
    fn namespace(&self) -> Option<&str> {
        None
    }
    fn uid(&self) -> &str {
        &self.metadata.uid
    }
    fn generation(&self) -> i64 {
        self.metadata.generation
    }
    fn observed_generation(&self) -> i64 {
        self.status.observed_generation
    }
    fn is_deleting(&self) -> bool {
        self.metadata.is_deleting()
    }
    fn finalizers(&self) -> &[String] {
        &self.metadata.finalizers
    }
}

/// Namespace-scoped Rule custom resource: declares downstream webhooks
/// to call for matching admission requests in its namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResource {
    pub metadata: ResourceMeta,
    pub spec: RuleSpec,
    #[serde(default)]
    pub status: RuleStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleSpec {
    pub webhooks: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleStatus {
    pub observed_generation: i64,
}

impl RuleResource {
    /// The Rule resource's own namespace, used to resolve webhook
    /// entries whose `ClientConfig::Service.namespace` is empty.
    pub fn own_namespace(&self) -> &str {
        self.metadata.namespace.as_deref().unwrap_or_default()
    }
}

impl ReconcilableResource for RuleResource {
    fn name(&self) -> &str {
        &self.metadata.name
    }
    fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }
    fn uid(&self) -> &str {
        &self.metadata.uid
    }
    fn generation(&self) -> i64 {
        self.metadata.generation
    }
    fn observed_generation(&self) -> i64 {
        self.status.observed_generation
    }
    fn is_deleting(&self) -> bool {
        self.metadata.is_deleting()
    }
    fn finalizers(&self) -> &[String] {
        &self.metadata.finalizers
    }
}
