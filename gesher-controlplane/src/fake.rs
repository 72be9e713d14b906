use crate::client::ControlPlaneClient;
use crate::error::ControlPlaneError;
use async_trait::async_trait;
use gesher_types::{GlobalWebhookConfiguration, RuleResource, TypeResource};
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory `ControlPlaneClient` backing this crate's own tests and
/// the reconciler integration suites. Ordinary test tooling — not a
/// production backend.
#[derive(Default)]
pub struct FakeControlPlaneClient {
    types: Mutex<HashMap<String, TypeResource>>,
    rules: Mutex<HashMap<(String, String), RuleResource>>,
    webhook: Mutex<Option<GlobalWebhookConfiguration>>,
}

impl FakeControlPlaneClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_type(&self, resource: TypeResource) {
        self.types
            .lock()
            .expect("fake control plane lock poisoned")
            .insert(resource.metadata.name.clone(), resource);
    }

    pub fn seed_rule(&self, resource: RuleResource) {
        let key = (resource.own_namespace().to_string(), resource.metadata.name.clone());
        self.rules
            .lock()
            .expect("fake control plane lock poisoned")
            .insert(key, resource);
    }
}

#[async_trait]
impl ControlPlaneClient for FakeControlPlaneClient {
    async fn get_type(&self, name: &str) -> Result<Option<TypeResource>, ControlPlaneError> {
        Ok(self
            .types
            .lock()
            .expect("fake control plane lock poisoned")
            .get(name)
            .cloned())
    }

    async fn list_types(&self) -> Result<Vec<TypeResource>, ControlPlaneError> {
        Ok(self
            .types
            .lock()
            .expect("fake control plane lock poisoned")
            .values()
            .cloned()
            .collect())
    }

    async fn update_type_status(
        &self,
        resource: &TypeResource,
    ) -> Result<TypeResource, ControlPlaneError> {
        let mut guard = self.types.lock().expect("fake control plane lock poisoned");
        guard.insert(resource.metadata.name.clone(), resource.clone());
        Ok(resource.clone())
    }

    async fn get_rule(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<RuleResource>, ControlPlaneError> {
        Ok(self
            .rules
            .lock()
            .expect("fake control plane lock poisoned")
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn list_rules(&self, namespace: Option<&str>) -> Result<Vec<RuleResource>, ControlPlaneError> {
        let guard = self.rules.lock().expect("fake control plane lock poisoned");
        Ok(guard
            .values()
            .filter(|r| namespace.map_or(true, |ns| r.own_namespace() == ns))
            .cloned()
            .collect())
    }

    async fn update_rule_status(
        &self,
        resource: &RuleResource,
    ) -> Result<RuleResource, ControlPlaneError> {
        let key = (resource.own_namespace().to_string(), resource.metadata.name.clone());
        let mut guard = self.rules.lock().expect("fake control plane lock poisoned");
        guard.insert(key, resource.clone());
        Ok(resource.clone())
    }

    async fn get_webhook(&self) -> Result<Option<GlobalWebhookConfiguration>, ControlPlaneError> {
        Ok(self
            .webhook
            .lock()
            .expect("fake control plane lock poisoned")
            .clone())
    }

    async fn create_webhook(
        &self,
        desired: &GlobalWebhookConfiguration,
    ) -> Result<GlobalWebhookConfiguration, ControlPlaneError> {
        let mut guard = self.webhook.lock().expect("fake control plane lock poisoned");
        if guard.is_some() {
            return Err(ControlPlaneError::Conflict(desired.name.clone()));
        }
        let mut created = desired.clone();
        created.resource_version = Some("1".to_string());
        *guard = Some(created.clone());
        Ok(created)
    }

    async fn update_webhook(
        &self,
        desired: &GlobalWebhookConfiguration,
    ) -> Result<GlobalWebhookConfiguration, ControlPlaneError> {
        let mut guard = self.webhook.lock().expect("fake control plane lock poisoned");
        let Some(current) = guard.as_ref() else {
            return Err(ControlPlaneError::NotFound(desired.name.clone()));
        };
        let next_version = current
            .resource_version
            .as_deref()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        let mut updated = desired.clone();
        updated.resource_version = Some(next_version.to_string());
        *guard = Some(updated.clone());
        Ok(updated)
    }
}
