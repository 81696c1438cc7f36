use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use axum::Router;
use payin_router::circuit::monitor::CircuitMonitor;
use payin_router::config::AppConfig;
use payin_router::registry::EndpointRegistry;
use payin_router::service::engine::RoutingEngine;
use payin_router::service::ticker::BreakerTicker;
use payin_router::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let registry = Arc::new(EndpointRegistry::new());
    let monitor = Arc::new(CircuitMonitor::new(cfg.breaker.clone()));
    let engine = RoutingEngine::new(
        registry,
        monitor,
        cfg.weights.clone(),
        cfg.max_reserve_attempts,
    );

    let ticker = BreakerTicker {
        engine: engine.clone(),
        interval: std::time::Duration::from_secs(cfg.ticker_interval_secs),
    };
    tokio::spawn(ticker.run());

    let state = AppState { engine };

    let admin_key = cfg.internal_api_key.clone();
    let admin_routes = Router::new()
        .route(
            "/circuit-breaker/reset/:bank",
            post(payin_router::http::handlers::circuit_breaker::reset),
        )
        .route(
            "/endpoints",
            post(payin_router::http::handlers::endpoints::create_endpoint),
        )
        .route(
            "/endpoints/:id",
            patch(payin_router::http::handlers::endpoints::update_endpoint),
        )
        .route(
            "/alerts/:id/ack",
            post(payin_router::http::handlers::alerts::acknowledge_alert),
        )
        .layer(from_fn_with_state(
            admin_key,
            payin_router::http::middleware::admin_auth::require_internal_api_key,
        ));

    let app = Router::new()
        .route("/health", get(payin_router::http::handlers::payins::health))
        .route(
            "/payins/select",
            post(payin_router::http::handlers::payins::select_endpoint),
        )
        .route(
            "/payins/:selection_id/outcome",
            post(payin_router::http::handlers::payins::report_outcome),
        )
        .route(
            "/endpoints",
            get(payin_router::http::handlers::endpoints::list_endpoints),
        )
        .route(
            "/circuit-breaker/status",
            get(payin_router::http::handlers::circuit_breaker::status),
        )
        .route(
            "/circuit-breaker/audit",
            get(payin_router::http::handlers::circuit_breaker::audit),
        )
        .route(
            "/stats/realtime",
            get(payin_router::http::handlers::stats::realtime),
        )
        .route(
            "/selection-logs",
            get(payin_router::http::handlers::stats::selection_logs),
        )
        .route(
            "/alerts",
            get(payin_router::http::handlers::alerts::list_alerts),
        )
        .route("/ops/readiness", get(payin_router::http::handlers::ops::readiness))
        .route("/ops/liveness", get(payin_router::http::handlers::ops::liveness))
        .merge(admin_routes)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
