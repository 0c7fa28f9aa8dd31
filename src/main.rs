use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use ip_filter::{api, config, filter, metrics};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ip_filter=info".parse()?)
        )
        .init();

    info!("Starting IP filter v{}", env!("CARGO_PKG_VERSION"));

    let cfg = config::load()?;
    info!("Configuration loaded ({} deny entries)", cfg.filter.deny.len());

    let filter = Arc::new(filter::FilterEngine::new(&cfg.filter));
    let metrics = Arc::new(metrics::FilterMetrics::default());

    tokio::try_join!(
        api::serve(cfg.clone(), filter.clone(), metrics.clone()),
        reload_on_hangup(filter.clone()),
    )?;

    Ok(())
}

/// Re-read the configuration and rebuild the deny list on every SIGHUP.
#[cfg(unix)]
async fn reload_on_hangup(filter: Arc<filter::FilterEngine>) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    while hangup.recv().await.is_some() {
        info!("SIGHUP received, reloading deny list");
        match config::load() {
            Ok(cfg) => {
                if let Err(e) = filter.reload(&cfg.filter).await {
                    tracing::error!("Deny list reload failed, keeping current deny list: {:#}", e);
                }
            }
            Err(e) => tracing::warn!("Config reload failed, keeping current deny list: {:#}", e),
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn reload_on_hangup(_filter: Arc<filter::FilterEngine>) -> Result<()> {
    std::future::pending().await
}
