//! Employee sync server binary
//!
//! Configuration comes from the environment; see `ServerConfig::from_lookup`.
//! Log verbosity follows `RUST_LOG` (default `info`).

use tracing_subscriber::EnvFilter;

use employee_sync::{EmployeeServer, ServerConfig};

#[tokio::main]
async fn main() -> employee_sync::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;

    tracing::info!(
        bind = %config.bind_addr,
        environment = %config.environment,
        public_url = config.public_url.as_deref().unwrap_or("Not set"),
        ws_path = %config.ws_path,
        max_employees = config.sync.max_records,
        employees_per_page = config.sync.page_size,
        update_interval_ms = config.sync.insert_interval.as_millis() as u64,
        "Starting employee sync server"
    );

    EmployeeServer::new(config)
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await
}
