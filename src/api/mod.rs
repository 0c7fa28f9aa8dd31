use anyhow::Result;
use axum::Router;
use tower_http::trace::TraceLayer;
use std::sync::Arc;
use std::net::SocketAddr;
use crate::config::Config;
use crate::filter::FilterEngine;
use crate::metrics::FilterMetrics;

pub mod client_ip;
pub mod handlers;
pub mod router;

pub struct AppState {
    pub filter: Arc<FilterEngine>,
    pub metrics: Arc<FilterMetrics>,
}

pub async fn serve(
    cfg: Config,
    filter: Arc<FilterEngine>,
    metrics: Arc<FilterMetrics>,
) -> Result<()> {
    let bind_addr = SocketAddr::new(cfg.api.bind.parse()?, cfg.api.port);
    let state = Arc::new(AppState { filter, metrics });
    let app = build_app(state);

    // ConnectInfo supplies the TCP peer address when no client-IP header is usable
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("IP filter API listening on http://{}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    ).await?;
    Ok(())
}

pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(router::routes(state))
        .layer(TraceLayer::new_for_http())
}
