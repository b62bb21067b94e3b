use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::api::handlers::{self, AppState};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Projects
        .route(
            "/projects",
            get(handlers::list_projects::<S>).post(handlers::create_project::<S>),
        )
        .route(
            "/projects/:project_id",
            get(handlers::get_project::<S>).patch(handlers::update_project::<S>),
        )
        .route(
            "/projects/:project_id/overview",
            get(handlers::get_project_overview::<S>),
        )
        .route(
            "/projects/:project_id/versions",
            get(handlers::list_versions::<S>).post(handlers::create_version::<S>),
        )
        // Versions and their lifecycle
        .route("/versions/:version_id", get(handlers::get_version::<S>))
        .route(
            "/versions/:version_id/publish",
            post(handlers::publish_version::<S>),
        )
        .route(
            "/versions/:version_id/deprecate",
            post(handlers::deprecate_version::<S>),
        )
        .route(
            "/versions/:version_id/status",
            put(handlers::set_version_status::<S>),
        )
        // Endpoints and rendered documentation
        .route(
            "/versions/:version_id/endpoints",
            get(handlers::list_endpoints::<S>).post(handlers::create_endpoint::<S>),
        )
        .route(
            "/versions/:version_id/docs",
            get(handlers::get_documentation::<S>),
        )
        .route(
            "/versions/:version_id/endpoints/:endpoint_id/examples/:language",
            get(handlers::get_example::<S>),
        )
        // Reader feedback
        .route(
            "/versions/:version_id/feedback",
            get(handlers::list_feedback::<S>).post(handlers::submit_feedback::<S>),
        )
        // Documentation is read from browsers on other origins
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}
