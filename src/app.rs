/*
 * Responsibility
 * - load Config → build dependencies → assemble the Router
 * - apply middleware (CORS / HTTP / access)
 * - start axum::serve() on the port the function host gave us
 */
use std::net::SocketAddr;
use std::panic;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, handlers::fallback::not_found};
use crate::config::Config;
use crate::middleware;
use crate::services::auth::build_auth_service;
use crate::services::health::HttpHealthProbe;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,vault_gateway=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics through tracing; stderr may not reach the host's log stream.
        tracing::error!(?info, "panic");
        default_hook(info);
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    init_panic_hook();

    let config = Config::from_env()?;

    tracing::info!(
        "starting gateway in {:?} mode on {} (tenant {})",
        config.app_env,
        config.addr,
        config.auth_tenant_id
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config)?;

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

fn build_state(config: &Config) -> Result<AppState> {
    let auth = build_auth_service(config).context("failed to build auth service")?;
    let health = HttpHealthProbe::new(config.health_check_url.clone(), config.health_check_timeout)
        .context("failed to build health probe")?;

    Ok(AppState::new(auth, Arc::new(health)))
}

fn build_router(state: AppState, config: &Config) -> Result<Router> {
    let unmapped = state.auth.path_scope().unmapped(api::PROTECTED_PATHS);
    if !unmapped.is_empty() {
        bail!("PATH_SCOPE has no entry for protected path(s): {}", unmapped.join(", "));
    }

    let routes = api::routes(state.clone());
    let router = if config.route_prefix.is_empty() {
        Router::new().merge(routes)
    } else {
        Router::new().nest(&config.route_prefix, routes)
    };
    let router = router.fallback(not_found).with_state(state);

    let router = middleware::cors::apply(router, config);
    Ok(middleware::http::apply(router, config.into()))
}
