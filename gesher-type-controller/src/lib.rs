//! The `TypeController` reconciler. Ties the cluster-scoped Type
//! custom resource to [`gesher_type_registry::TypeRegistry`]
//! and, through [`gesher_webhook_sync`], the single global webhook
//! registration.
//!
//! Observe -> analyze -> act, same shape as [`gesher_rule_controller::RuleController`]:
//! fetch the resource, derive the desired state, write the control
//! plane, and only then swap the in-memory registry.

mod error;

pub use error::ReconcileError;

use gesher_controlplane::ControlPlaneClient;
use gesher_type_registry::TypeRegistryHandle;
use gesher_types::{ProxyClientConfig, TypeResource};
use gesher_webhook_sync::SyncOutcome;
use std::sync::Arc;
use tracing::info;

/// Finalizer this controller adds to every non-deleting Type resource
/// and removes only after the global webhook has been re-synchronized
/// without it.
pub const TYPE_FINALIZER: &str = "gesher.redislabs.com/type-controller";

/// What one call to [`TypeController::reconcile`] did, for the
/// caller's own logging/metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The named resource no longer exists; nothing to do — not-found
    /// means deletion was already reconciled.
    AlreadyGone,
    /// The resource's tuples were folded into the registry and the
    /// global webhook was synchronized to match.
    Synced(SyncOutcome),
    /// The resource was being deleted; its tuples were removed from
    /// the registry, the webhook re-synced, and the finalizer dropped.
    Deleted(SyncOutcome),
    /// A spurious/drift-check event (empty resource name): the webhook
    /// was re-asserted against the registry's current state with no
    /// resource read or write.
    DriftChecked(SyncOutcome),
}

pub struct TypeController {
    client: Arc<dyn ControlPlaneClient>,
    registry: TypeRegistryHandle,
    proxy: ProxyClientConfig,
}

impl TypeController {
    pub fn new(
        client: Arc<dyn ControlPlaneClient>,
        registry: TypeRegistryHandle,
        proxy: ProxyClientConfig,
    ) -> Self {
        Self {
            client,
            registry,
            proxy,
        }
    }

    /// Reconcile the Type resource named `name`, or — when `name` is
    /// `None` — perform a drift-check-only pass against the registry's
    /// current state. The controller also watches the global webhook
    /// itself; a spurious event carrying no resource name triggers this
    /// drift-check path instead of a resource observe.
    pub async fn reconcile(&self, name: Option<&str>) -> Result<ReconcileOutcome, ReconcileError> {
        let Some(name) = name else {
            let outcome = self.sync_webhook(&self.registry.snapshot().enumerate_rules()).await?;
            return Ok(ReconcileOutcome::DriftChecked(outcome));
        };

        // Observe.
        let Some(resource) = self.client.get_type(name).await? else {
            return Ok(ReconcileOutcome::AlreadyGone);
        };

        // Analyze: derive the candidate registry and its rule list
        // without mutating the live handle yet.
        let deleting = resource.is_deleting();
        let candidate = if deleting {
            self.registry.snapshot().delete(&resource)
        } else {
            self.registry.snapshot().update(&resource)
        };
        let desired_rules = candidate.enumerate_rules();

        // Act, step 1: synchronize the global webhook.
        let sync_outcome = self.sync_webhook(&desired_rules).await?;

        // Act, step 2: ensure finalizer state and bump observedGeneration.
        let mut updated = resource.clone();
        if deleting {
            updated.metadata.remove_finalizer(TYPE_FINALIZER);
        } else {
            updated.metadata.add_finalizer(TYPE_FINALIZER);
            updated.status.observed_generation = updated.metadata.generation;
        }
        if updated != resource {
            self.client.update_type_status(&updated).await?;
        }

        // Act, step 3: only now persist the in-memory registry swap —
        // after every control-plane write has succeeded.
        if deleting {
            self.registry.delete(&resource);
            info!(type_name = %name, "type resource deleted, registry entries removed");
            Ok(ReconcileOutcome::Deleted(sync_outcome))
        } else {
            self.registry.update(&resource);
            info!(
                type_name = %name,
                generation = resource.metadata.generation,
                "type resource reconciled"
            );
            Ok(ReconcileOutcome::Synced(sync_outcome))
        }
    }

    async fn sync_webhook(
        &self,
        desired_rules: &[gesher_types::RuleWithOperations],
    ) -> Result<SyncOutcome, ReconcileError> {
        Ok(gesher_webhook_sync::reconcile(
            self.client.as_ref(),
            desired_rules.to_vec(),
            self.proxy.clone(),
        )
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesher_controlplane::FakeControlPlaneClient;
    use gesher_types::{InterestingTuple, Operation, ResourceMeta, Scope, TypeSpec};

    fn proxy() -> ProxyClientConfig {
        ProxyClientConfig {
            namespace: "default".into(),
            name: "gesher".into(),
            path: "/proxy".into(),
            ca_bundle: vec![],
        }
    }

    fn type_resource(name: &str, generation: i64, tuples: Vec<InterestingTuple>) -> TypeResource {
        TypeResource {
            metadata: ResourceMeta {
                name: name.to_string(),
                namespace: None,
                uid: format!("uid-{name}"),
                generation,
                deletion_timestamp: None,
                finalizers: vec![],
            },
            spec: TypeSpec { tuples },
            status: Default::default(),
        }
    }

    fn namespaces_tuple(op: Operation) -> InterestingTuple {
        InterestingTuple::new("", "v1", "namespaces", op, Scope::Namespaced)
    }

    fn controller() -> (Arc<FakeControlPlaneClient>, TypeController) {
        let client = Arc::new(FakeControlPlaneClient::new());
        let controller = TypeController::new(client.clone(), TypeRegistryHandle::new(), proxy());
        (client, controller)
    }

    #[tokio::test]
    async fn reconcile_of_missing_resource_is_already_gone() {
        let (_client, controller) = controller();
        let outcome = controller.reconcile(Some("missing")).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::AlreadyGone);
    }

    #[tokio::test]
    async fn reconcile_creates_webhook_adds_finalizer_and_bumps_observed_generation() {
        let (client, controller) = controller();
        let t1 = type_resource("t1", 1, vec![namespaces_tuple(Operation::Create)]);
        client.seed_type(t1);

        let outcome = controller.reconcile(Some("t1")).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::Synced(SyncOutcome::Created));

        let stored = client.get_type("t1").await.unwrap().unwrap();
        assert_eq!(stored.status.observed_generation, 1);
        assert!(stored.metadata.has_finalizer(TYPE_FINALIZER));

        let webhook = client.get_webhook().await.unwrap().unwrap();
        assert_eq!(webhook.webhooks.len(), 1);
        assert_eq!(webhook.webhooks[0].rules.len(), 1);
    }

    #[tokio::test]
    async fn two_types_on_same_gvr_merge_into_one_webhook_entry() {
        let (client, controller) = controller();
        client.seed_type(type_resource("t1", 1, vec![namespaces_tuple(Operation::Create)]));
        client.seed_type(type_resource("t2", 1, vec![namespaces_tuple(Operation::Delete)]));

        controller.reconcile(Some("t1")).await.unwrap();
        controller.reconcile(Some("t2")).await.unwrap();

        let webhook = client.get_webhook().await.unwrap().unwrap();
        assert_eq!(webhook.webhooks.len(), 1, "exactly one webhook entry expected");
        let mut ops = webhook.webhooks[0].rules[0].operations.clone();
        ops.sort();
        assert_eq!(ops, vec![Operation::Create, Operation::Delete]);
    }

    #[tokio::test]
    async fn deleting_one_of_two_types_leaves_the_other_rule() {
        let (client, controller) = controller();
        let t1 = type_resource("t1", 1, vec![namespaces_tuple(Operation::Create)]);
        client.seed_type(t1.clone());
        client.seed_type(type_resource("t2", 1, vec![namespaces_tuple(Operation::Delete)]));
        controller.reconcile(Some("t1")).await.unwrap();
        controller.reconcile(Some("t2")).await.unwrap();

        let mut deleting = client.get_type("t1").await.unwrap().unwrap();
        deleting.metadata.deletion_timestamp = Some(chrono::Utc::now());
        client.seed_type(deleting);

        let outcome = controller.reconcile(Some("t1")).await.unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Deleted(_)));

        let webhook = client.get_webhook().await.unwrap().unwrap();
        assert_eq!(webhook.webhooks[0].rules.len(), 1);
        assert_eq!(webhook.webhooks[0].rules[0].operations, vec![Operation::Delete]);
        assert!(!client
            .get_type("t1")
            .await
            .unwrap()
            .unwrap()
            .metadata
            .has_finalizer(TYPE_FINALIZER));
    }

    #[tokio::test]
    async fn deleting_both_types_leaves_webhook_entry_with_empty_rules() {
        let (client, controller) = controller();
        client.seed_type(type_resource("t1", 1, vec![namespaces_tuple(Operation::Create)]));
        controller.reconcile(Some("t1")).await.unwrap();

        let mut deleting = client.get_type("t1").await.unwrap().unwrap();
        deleting.metadata.deletion_timestamp = Some(chrono::Utc::now());
        client.seed_type(deleting);
        controller.reconcile(Some("t1")).await.unwrap();

        let webhook = client.get_webhook().await.unwrap().unwrap();
        assert_eq!(webhook.webhooks.len(), 1);
        assert!(webhook.webhooks[0].rules.is_empty());
    }

    #[tokio::test]
    async fn drift_only_event_resyncs_without_touching_any_resource() {
        let (client, controller) = controller();
        client.seed_type(type_resource("t1", 1, vec![namespaces_tuple(Operation::Create)]));
        controller.reconcile(Some("t1")).await.unwrap();

        let mut drifted = client.get_webhook().await.unwrap().unwrap();
        drifted.webhooks[0].rules.clear();
        client.update_webhook(&drifted).await.unwrap();

        let outcome = controller.reconcile(None).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::DriftChecked(SyncOutcome::Updated));
        let webhook = client.get_webhook().await.unwrap().unwrap();
        assert_eq!(webhook.webhooks[0].rules.len(), 1);
    }

    #[tokio::test]
    async fn reconcile_twice_with_unchanged_generation_is_idempotent() {
        let (client, controller) = controller();
        client.seed_type(type_resource("t1", 1, vec![namespaces_tuple(Operation::Create)]));
        controller.reconcile(Some("t1")).await.unwrap();
        let outcome = controller.reconcile(Some("t1")).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::Synced(SyncOutcome::NoOp));
    }
}
