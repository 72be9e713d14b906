//! `GlobalWebhookSynchronizer`. Creates or updates the single
//! cluster-scoped validating-webhook registration so that its rule
//! list equals what `TypeRegistry` demands.

use gesher_controlplane::{ControlPlaneClient, ControlPlaneError};
use gesher_types::{GlobalWebhookConfiguration, GlobalWebhookSpec, ProxyClientConfig, RuleWithOperations};
use tracing::info;

/// What `reconcile` did, for the caller's own logging/metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created,
    Updated,
    NoOp,
}

/// Creates or updates the fixed-name global webhook so its single
/// entry's `rules` field equals `desired_rules`. Idempotent: calling
/// twice in a row with the same `desired_rules` yields `Created` then
/// `NoOp`.
pub async fn reconcile(
    client: &dyn ControlPlaneClient,
    desired_rules: Vec<RuleWithOperations>,
    proxy: ProxyClientConfig,
) -> Result<SyncOutcome, ControlPlaneError> {
    let desired_spec = GlobalWebhookSpec::desired(desired_rules, proxy);

    match client.get_webhook().await? {
        None => {
            let cfg = GlobalWebhookConfiguration {
                name: desired_spec.name.clone(),
                resource_version: None,
                webhooks: vec![desired_spec],
            };
            client.create_webhook(&cfg).await?;
            info!(name = %cfg.name, "created global webhook");
            Ok(SyncOutcome::Created)
        }
        Some(current) => {
            if current.webhooks == vec![desired_spec.clone()] {
                Ok(SyncOutcome::NoOp)
            } else {
                let updated = GlobalWebhookConfiguration {
                    name: current.name,
                    resource_version: current.resource_version,
                    webhooks: vec![desired_spec],
                };
                client.update_webhook(&updated).await?;
                info!(name = %updated.name, "updated global webhook rules");
                Ok(SyncOutcome::Updated)
            }
        }
    }
}
