use crate::error::ControlPlaneError;
use async_trait::async_trait;

/// Leader election: only one operator instance runs reconcilers and
/// serves admission traffic at a time. `become_leader` resolves once
/// this instance has won the election and blocks followers for as
/// long as they remain followers.
#[async_trait]
pub trait LeaderElector: Send + Sync {
    async fn become_leader(&self) -> Result<(), ControlPlaneError>;
}

/// A `LeaderElector` for single-instance deployments and tests: always
/// wins immediately.
pub struct AlwaysLeader;

#[async_trait]
impl LeaderElector for AlwaysLeader {
    async fn become_leader(&self) -> Result<(), ControlPlaneError> {
        Ok(())
    }
}
