use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use courier_gateway::OrchestratorBuilder;
use courier_server::api::AppState;
use courier_server::config::CourierConfig;
use courier_server::escalation::WebhookEscalation;

/// Courier delivery engine HTTP server.
#[derive(Parser, Debug)]
#[command(name = "courier-server", about = "Standalone HTTP server for Courier")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "courier.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from TOML file, or use defaults if the file does not exist.
    let config_exists = Path::new(&cli.config).exists();
    let config: CourierConfig = if config_exists {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        toml::from_str("")?
    };

    courier_server::telemetry::init(&config.logging);

    if !config_exists {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    let mut providers = courier_server::provider_factory::create_providers(&config.providers)?;
    if providers.is_empty() {
        warn!("no providers configured, registering a log provider");
        providers.register(Arc::new(courier_provider::LogProvider::new("log")));
    }

    let audit = courier_server::audit_factory::create_audit_store(&config.audit);

    let mut builder = OrchestratorBuilder::new()
        .providers(providers)
        .config(config.orchestrator_config());
    if let Some(ref store) = audit {
        builder = builder.audit(Arc::clone(store));
        info!(capacity = config.audit.capacity, "audit store initialized");
    }
    if let Some(ref url) = config.escalation.webhook_url {
        let escalation = WebhookEscalation::new(
            url,
            Duration::from_secs(config.escalation.timeout_seconds),
        )?;
        builder = builder.escalation(Arc::new(escalation));
        info!(url = %url, "webhook escalation enabled");
    }
    let orchestrator = Arc::new(builder.build()?);

    let prober = if config.health.probes_enabled {
        Some(orchestrator.start_health_probes())
    } else {
        info!("background health probes disabled");
        None
    };

    let state = AppState {
        orchestrator: Arc::clone(&orchestrator),
        audit,
    };
    let app = courier_server::api::router(state);

    // Resolve the bind address (CLI overrides take precedence).
    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        address = %addr,
        providers = orchestrator.providers().len(),
        "courier-server listening"
    );

    // Serve with graceful shutdown on SIGINT / SIGTERM.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(prober) = prober {
        prober.shutdown().await;
    }

    // Wait for pending audit writes and escalations (with configurable timeout).
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
    info!(
        timeout_secs = config.server.shutdown_timeout_seconds,
        "waiting for pending background tasks..."
    );
    if tokio::time::timeout(shutdown_timeout, orchestrator.shutdown())
        .await
        .is_err()
    {
        warn!(
            timeout_secs = config.server.shutdown_timeout_seconds,
            "shutdown timeout exceeded, some audit records may be lost"
        );
    }

    info!("courier-server shut down");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
