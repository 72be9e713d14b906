use serde::{Deserialize, Serialize};

/// How to reach a downstream (or the operator's own) webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientConfig {
    /// An in-cluster service reference. `namespace` is resolved at
    /// `RuleIndex::add` time to the owning Rule resource's namespace
    /// when left empty.
    Service {
        namespace: String,
        name: String,
        #[serde(default)]
        port: Option<u16>,
        #[serde(default)]
        path: Option<String>,
    },
    /// A raw URL, bypassing in-cluster service resolution.
    Url(String),
}

impl ClientConfig {
    /// Fill in an empty service namespace with the Rule resource's own
    /// namespace. No-op for `Url` and already-namespaced `Service` configs.
    pub fn resolve_namespace(&mut self, owner_namespace: &str) {
        if let ClientConfig::Service { namespace, .. } = self {
            if namespace.is_empty() {
                namespace.clone_from(&owner_namespace.to_string());
            }
        }
    }

    /// Build the target URL this config should be POSTed to.
    pub fn target_url(&self) -> String {
        match self {
            ClientConfig::Service {
                namespace,
                name,
                port,
                path,
            } => {
                let port_part = port.map(|p| format!(":{p}")).unwrap_or_default();
                let path_part = path.as_deref().unwrap_or("/");
                format!("https://{name}.{namespace}{port_part}{path_part}")
            }
            ClientConfig::Url(url) => url.clone(),
        }
    }
}

/// Policy applied to transport-level failures calling an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    Fail,
    Ignore,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Fail
    }
}

pub const DEFAULT_TIMEOUT_SECONDS: u32 = 30;
