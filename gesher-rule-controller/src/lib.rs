//! The `RuleController` reconciler. Same observe -> analyze -> act
//! skeleton as [`gesher_type_controller::TypeController`],
//! but Act never talks to the global webhook — the proxy reads
//! [`gesher_rule_index::RuleIndex`] directly, so there is nothing
//! downstream of the index write to synchronize.

mod error;

pub use error::ReconcileError;

use gesher_controlplane::ControlPlaneClient;
use gesher_rule_index::RuleIndexHandle;
use std::sync::Arc;
use tracing::info;

/// Finalizer this controller adds to every non-deleting Rule resource.
/// Distinct from [`gesher_type_controller::TYPE_FINALIZER`] so the two
/// controllers never contend over the same finalizer slot.
pub const RULE_FINALIZER: &str = "gesher.redislabs.com/rule-controller";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Not found — deletion already reconciled.
    AlreadyGone,
    /// The resource's webhooks were folded into (or re-folded into) the index.
    Synced,
    /// The resource was being deleted: removed from the index first,
    /// finalizer dropped only after that succeeded.
    Deleted,
}

pub struct RuleController {
    client: Arc<dyn ControlPlaneClient>,
    index: RuleIndexHandle,
    /// `WATCH_NAMESPACE`: namespaces this controller reconciles Rule
    /// resources in. `None` means all namespaces.
    watched_namespaces: Option<Vec<String>>,
}

impl RuleController {
    pub fn new(client: Arc<dyn ControlPlaneClient>, index: RuleIndexHandle) -> Self {
        Self {
            client,
            index,
            watched_namespaces: None,
        }
    }

    pub fn with_watched_namespaces(mut self, namespaces: Vec<String>) -> Self {
        self.watched_namespaces = Some(namespaces);
        self
    }

    /// Whether this controller is configured to reconcile Rule
    /// resources in `namespace`. `WATCH_NAMESPACE` empty/unset means
    /// "all namespaces".
    pub fn watches(&self, namespace: &str) -> bool {
        match &self.watched_namespaces {
            None => true,
            Some(namespaces) => namespaces.iter().any(|n| n == namespace),
        }
    }

    pub async fn reconcile(&self, namespace: &str, name: &str) -> Result<ReconcileOutcome, ReconcileError> {
        // Observe.
        let Some(resource) = self.client.get_rule(namespace, name).await? else {
            return Ok(ReconcileOutcome::AlreadyGone);
        };

        let deleting = resource.is_deleting();

        if deleting {
            // Act, step 1: remove this instance's endpoints from the
            // live index before the finalizer is dropped, so no
            // in-flight admission request can be routed to a
            // downstream that is about to disappear from the control
            // plane.
            self.index.delete(&resource);

            let mut updated = resource.clone();
            updated.metadata.remove_finalizer(RULE_FINALIZER);
            if updated != resource {
                self.client.update_rule_status(&updated).await?;
            }
            info!(namespace, name, "rule resource deleted, endpoints removed from index");
            Ok(ReconcileOutcome::Deleted)
        } else {
            // An update whose generation didn't change still
            // re-asserts the index — safe, idempotent.
            self.index.update(&resource);

            let mut updated = resource.clone();
            updated.metadata.add_finalizer(RULE_FINALIZER);
            updated.status.observed_generation = updated.metadata.generation;
            if updated != resource {
                self.client.update_rule_status(&updated).await?;
            }
            info!(
                namespace,
                name,
                generation = resource.metadata.generation,
                "rule resource reconciled"
            );
            Ok(ReconcileOutcome::Synced)
        }
    }
}
