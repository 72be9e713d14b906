//! Shared data model for gesher.
//!
//! Every other crate in the workspace builds on the types defined
//! here: the interesting-tuple identity shared by Type rules and Rule
//! webhook rules, the two custom resource kinds, the admission review
//! wire format, and the derived global webhook spec.

mod admission;
mod client_config;
mod global_webhook;
mod operation;
mod resource;
mod tuple;
mod webhook;

pub use admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, GroupVersionResource, StatusResult};
pub use client_config::{ClientConfig, FailurePolicy, DEFAULT_TIMEOUT_SECONDS};
pub use global_webhook::{
    GlobalWebhookConfiguration, GlobalWebhookSpec, ProxyClientConfig, SideEffects,
    GLOBAL_WEBHOOK_NAME, GLOBAL_WEBHOOK_PATH, GLOBAL_WEBHOOK_TIMEOUT_SECONDS,
};
pub use operation::{Operation, Scope, UnknownOperation};
pub use resource::{
    ReconcilableResource, ResourceMeta, RuleResource, RuleSpec, RuleStatus, TypeResource, TypeSpec,
    TypeStatus,
};
pub use tuple::{InterestingTuple, RuleWithOperations, WILDCARD};
pub use webhook::{ResolvedEndpoint, WebhookEntry};
