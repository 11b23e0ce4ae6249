use crate::output::UserOutput;
use remote_starter::config::{format_duration, PanelConfig};
use remote_starter::process::{ProcessHost, SystemHost};
use remote_starter::{http, ControlPanel};
use std::net::SocketAddr;
use std::sync::Arc;

pub async fn run_serve(config: &PanelConfig, out: &dyn UserOutput) -> anyhow::Result<()> {
    let host: Arc<dyn ProcessHost> = Arc::new(SystemHost::new());
    let panel = Arc::new(ControlPanel::open(config, host));

    print_banner(config, out);
    tracing::debug!(
        "Timeouts: query {}, terminate {}",
        format_duration(config.query_timeout()),
        format_duration(config.terminate_timeout())
    );

    http::serve(panel, config, shutdown_signal()).await?;
    Ok(())
}

fn print_banner(config: &PanelConfig, out: &dyn UserOutput) {
    let port = config
        .listen
        .parse::<SocketAddr>()
        .map(|addr| addr.port().to_string())
        .unwrap_or_else(|_| config.listen.clone());

    out.status("--- Remote Starter ---");
    out.status("Open the panel from a browser (e.g., on your phone) at:");
    out.status(&format!("   http://<this-machine-ip>:{}/", port));
    out.status(&format!(
        "Data: {} and {}",
        config.registry_path().display(),
        config.process_path().display()
    ));
    if config.uses_default_secret() {
        tracing::warn!("Serving with the default secret path");
        out.warning(
            "The secret path is still the default. Set secret_path in remote-starter.yaml \
             or pass --secret-path with a unique value.",
        );
    }
    out.status("----------------------");
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl-C, shutting down"),
        Err(e) => {
            // Without a signal handler the server runs until killed
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
