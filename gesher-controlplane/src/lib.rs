//! Thin adapters for the control-plane client, the TLS secret
//! provider, and leader election. These are the seams a real
//! control-plane backend would slot into; this crate defines the
//! interfaces and an in-memory fake, not a production backend.

mod client;
mod error;
mod fake;
mod leader;
mod tls;

pub use client::{ControlPlaneClient, WatchEvent};
pub use error::ControlPlaneError;
pub use fake::FakeControlPlaneClient;
pub use leader::{AlwaysLeader, LeaderElector};
pub use tls::{FileTlsBundleProvider, ServingBundle, TlsBundleProvider};
