//! Gateway serving the front-end bundle behind the route guard.

use crate::guard::{require_session, RouteGuard};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::get,
    Extension, Router,
};
use std::{path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer,
    services::{ServeDir, ServeFile},
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, warn, Span};
use ulid::Ulid;

pub mod handlers;

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub port: u16,
    pub assets: PathBuf,
    pub guard: RouteGuard,
}

/// Directory the static bundle is served from.
#[derive(Clone, Debug)]
pub struct Assets(pub PathBuf);

/// Builds the gateway router.
///
/// Unknown paths fall back to the bundle's `index.html` so client-side routes
/// resolve; the guard runs before any file is served. `/health` is never
/// guarded.
pub fn app(config: &GatewayConfig) -> Router {
    let guard = Arc::new(config.guard.clone());
    let bundle = ServeDir::new(&config.assets)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(config.assets.join("index.html")));

    Router::new()
        .fallback_service(bundle)
        .layer(middleware::from_fn_with_state(guard, require_session))
        .route("/health", get(handlers::health).head(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span)),
        )
        .layer(Extension(Assets(config.assets.clone())))
}

/// Binds `[::]:port` and serves until ctrl-c.
///
/// # Errors
/// Returns an error if the port cannot be bound or the server fails.
pub async fn new(config: GatewayConfig) -> Result<()> {
    if !config.assets.is_dir() {
        warn!("Assets directory {} does not exist", config.assets.display());
    }

    let app = app(&config);

    let listener = TcpListener::bind(format!("::0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    info!(
        "Listening on [::]:{}, protecting {:?}",
        config.port,
        config.guard.protected().prefixes()
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {err}");
                std::future::pending::<()>().await;
            }
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
