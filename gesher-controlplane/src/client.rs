use crate::error::ControlPlaneError;
use async_trait::async_trait;
use gesher_types::{GlobalWebhookConfiguration, RuleResource, TypeResource};

/// Reconciler input: a custom resource's watch stream delivers either
/// an upsert or a tombstone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent<T> {
    Applied(T),
    Deleted(T),
}

/// Read/write access to the two watched custom resource kinds and the
/// single cluster-scoped global webhook configuration.
///
/// Specialized per resource kind rather than generic over `T`, so the
/// trait stays object-safe for `Arc<dyn ControlPlaneClient>` wiring —
/// the same tradeoff `r2e-data::Repository<T, ID>` avoids by being
/// generic per backend instead of per call site.
#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    async fn get_type(&self, name: &str) -> Result<Option<TypeResource>, ControlPlaneError>;
    async fn list_types(&self) -> Result<Vec<TypeResource>, ControlPlaneError>;
    async fn update_type_status(
        &self,
        resource: &TypeResource,
    ) -> Result<TypeResource, ControlPlaneError>;

    async fn get_rule(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<RuleResource>, ControlPlaneError>;
    async fn list_rules(&self, namespace: Option<&str>) -> Result<Vec<RuleResource>, ControlPlaneError>;
    async fn update_rule_status(
        &self,
        resource: &RuleResource,
    ) -> Result<RuleResource, ControlPlaneError>;

    async fn get_webhook(&self) -> Result<Option<GlobalWebhookConfiguration>, ControlPlaneError>;
    async fn create_webhook(
        &self,
        desired: &GlobalWebhookConfiguration,
    ) -> Result<GlobalWebhookConfiguration, ControlPlaneError>;
    async fn update_webhook(
        &self,
        desired: &GlobalWebhookConfiguration,
    ) -> Result<GlobalWebhookConfiguration, ControlPlaneError>;
}
