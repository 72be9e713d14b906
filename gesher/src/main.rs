//! Process wiring for the gesher admission-proxy operator. Parses
//! configuration, loads the TLS bundle, joins leader election, wires
//! the two in-memory indices to their reconcilers, and serves the
//! HTTPS admission endpoint until shutdown.

mod config;
mod watch_loop;

use clap::Parser;
use config::Cli;
use gesher_controlplane::{AlwaysLeader, ControlPlaneClient, FakeControlPlaneClient, FileTlsBundleProvider, LeaderElector, TlsBundleProvider};
use gesher_proxy::ProxyState;
use gesher_rule_controller::RuleController;
use gesher_rule_index::RuleIndexHandle;
use gesher_type_controller::TypeController;
use gesher_type_registry::TypeRegistryHandle;
use gesher_types::ProxyClientConfig;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "gesher failed to start");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    // TLS provisioning, secret storage, and packaging of the
    // control-plane API types are out of scope here: there is no
    // production `ControlPlaneClient` to fabricate. `FakeControlPlaneClient`
    // is the same in-memory adapter the reconciler crates test
    // against — wiring it into the binary keeps the process runnable
    // end to end without inventing an unreviewed Kubernetes client
    // (see `DESIGN.md`).
    let control_plane: Arc<dyn ControlPlaneClient> = Arc::new(FakeControlPlaneClient::new());
    let leader: Arc<dyn LeaderElector> = Arc::new(AlwaysLeader);
    leader
        .become_leader()
        .await
        .map_err(|err| StartupError(format!("could not join leader election: {err}")))?;
    info!("became leader");

    let tls_provider = FileTlsBundleProvider { dir: cli.tls_dir.clone() };
    let serving_bundle = tls_provider
        .load_serving_bundle()
        .await
        .map_err(|err| StartupError(format!("could not load serving bundle: {err}")))?;
    let ca_bundle = tls_provider
        .load_ca_bundle()
        .await
        .map_err(|err| StartupError(format!("could not load CA bundle: {err}")))?;

    let proxy_client_config = ProxyClientConfig {
        namespace: cli.namespace.clone(),
        name: cli.service_name.clone(),
        path: gesher_types::GLOBAL_WEBHOOK_PATH.to_string(),
        ca_bundle,
    };

    let rule_index = RuleIndexHandle::new();
    let type_registry = TypeRegistryHandle::new();

    let type_controller = Arc::new(TypeController::new(
        control_plane.clone(),
        type_registry,
        proxy_client_config,
    ));
    let mut rule_controller = RuleController::new(control_plane.clone(), rule_index.clone());
    if let Some(namespaces) = cli.watched_namespaces() {
        rule_controller = rule_controller.with_watched_namespaces(namespaces);
    }
    let rule_controller = Arc::new(rule_controller);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let poll_interval = Duration::from_secs(cli.poll_interval_secs);

    let type_loop = tokio::spawn(watch_loop::run_type_loop(
        control_plane.clone(),
        type_controller,
        poll_interval,
        shutdown_rx.clone(),
    ));
    let rule_loop = tokio::spawn(watch_loop::run_rule_loop(
        control_plane.clone(),
        rule_controller,
        poll_interval,
        shutdown_rx,
    ));

    let tls_config = gesher_proxy::load_tls_config(&serving_bundle.cert_pem, &serving_bundle.key_pem)
        .await
        .map_err(|err| StartupError(format!("could not build TLS config: {err}")))?;
    let proxy_state = Arc::new(ProxyState::new(rule_index));
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));

    let shutdown_signal = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    };

    gesher_proxy::serve(addr, tls_config, proxy_state, shutdown_signal)
        .await
        .map_err(|err| StartupError(format!("admission proxy server failed: {err}")))?;

    let _ = shutdown_tx.send(true);
    let _ = tokio::join!(type_loop, rule_loop);
    info!("gesher stopped cleanly");
    Ok(())
}

/// Startup-level error: fatal, the process exits non-zero without
/// attempting recovery.
#[derive(Debug)]
struct StartupError(String);

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for StartupError {}
