use std::time::Instant;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, json::MAX_BODY_BYTES, metrics, state::AppState};

pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/blogs",
            get(handlers::list_blogs).post(handlers::create_blog),
        )
        .route(
            "/v1/blogs/:id",
            get(handlers::show_blog)
                .patch(handlers::update_blog)
                .delete(handlers::delete_blog),
        )
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/v1/health-check", get(handlers::health_check))
}

pub fn observability_routes() -> Router<AppState> {
    Router::new().route("/metrics", get(handlers::metrics_endpoint))
}

/// The complete application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(blog_routes())
        .merge(health_routes())
        .merge(observability_routes())
        .fallback(handlers::route_not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    let response = next.run(req).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    metrics::observe_http(method.as_str(), &path, status, elapsed.as_secs_f64());

    tracing::info!("{method} {uri} {status} {}ms", elapsed.as_millis());

    response
}
