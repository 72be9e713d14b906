use clap::Parser;

/// Process configuration: recognized options via flags and/or
/// environment, mirroring `r2e-cli`'s `Cli` struct — one `clap::Parser`
/// derive, every field with an explicit default.
#[derive(Debug, Parser)]
#[command(name = "gesher", version, about = "Admission-proxy operator for per-namespace validation policies")]
pub struct Cli {
    /// Namespace where the operator's own service lives.
    #[arg(long, env = "GESHER_NAMESPACE", default_value = "default")]
    pub namespace: String,

    /// Service name used for the operator's own self-reference inside
    /// the global webhook's `clientConfig`.
    #[arg(long = "service-name", env = "GESHER_SERVICE_NAME", default_value = "gesher")]
    pub service_name: String,

    /// Name of the control-plane secret holding the operator's TLS
    /// material (`privateKey`/`cert`).
    #[arg(long = "tls-secret", env = "GESHER_TLS_SECRET", default_value = "gesher-tls")]
    pub tls_secret: String,

    /// HTTPS listen port for the admission proxy.
    #[arg(long, env = "GESHER_PORT", default_value_t = 8443)]
    pub port: u16,

    /// Directory the TLS collaborator mirrors the serving bundle and
    /// CA bundle to (`<dir>/tls.crt`, `<dir>/tls.key`, `<dir>/ca.crt`).
    #[arg(long = "tls-dir", env = "GESHER_TLS_DIR", default_value = "/var/run/gesher/tls")]
    pub tls_dir: std::path::PathBuf,

    /// Comma-separated namespaces to reconcile Rule resources in;
    /// unset or empty means all namespaces.
    #[arg(long = "watch-namespace", env = "WATCH_NAMESPACE")]
    pub watch_namespace: Option<String>,

    /// Interval, in seconds, between reconciliation polls of the
    /// watched custom resource kinds. No native watch-stream is
    /// available from the control-plane client; this bridges that gap
    /// with plain polling against `ControlPlaneClient::list_*`.
    #[arg(long = "poll-interval-secs", default_value_t = 5)]
    pub poll_interval_secs: u64,
}

impl Cli {
    /// Split `WATCH_NAMESPACE` on commas, dropping blanks. `None` means
    /// "reconcile Rule resources in every namespace".
    pub fn watched_namespaces(&self) -> Option<Vec<String>> {
        let raw = self.watch_namespace.as_deref()?;
        let namespaces: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if namespaces.is_empty() {
            None
        } else {
            Some(namespaces)
        }
    }
}
