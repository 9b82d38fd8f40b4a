//! Tenant router server: loads tenants, opens one connection per tenant,
//! prepares each tenant's access log and serves the tenant-scoped routes.

use std::sync::Arc;
use tenant_router::{
    app,
    config::{load_tenants, AccessLogBackend, ServerConfig},
    AccessLogStore, AppState, MemoryAccessLog, PgAccessLog, TenantRegistry,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tenant_router=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let tenants = load_tenants(&config).await?;
    let registry = Arc::new(TenantRegistry::from_config(&tenants, &config.connection)?);

    let access_log: Arc<dyn AccessLogStore> = match config.access_log {
        AccessLogBackend::Postgres => Arc::new(PgAccessLog),
        AccessLogBackend::Memory => Arc::new(MemoryAccessLog::new()),
    };
    let state = AppState::new(registry.clone(), access_log.clone());
    for tenant_id in registry.tenant_ids() {
        let record = state.provider.connection_for(tenant_id.as_str())?;
        access_log.prepare(record).await?;
    }

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(tenants = registry.len(), "listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.close_all().await;
    tracing::info!("tenant connections closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
