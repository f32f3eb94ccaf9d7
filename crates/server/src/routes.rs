use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::{RetrievalQueueService, ReturnItemService};

use crate::observability;
use crate::openapi::ApiDoc;

pub mod events;
pub mod retrievals;
pub mod returns;

/// Services shared by every handler.
#[derive(Clone)]
pub struct ServerState {
    pub retrievals: Arc<RetrievalQueueService>,
    pub returns: Arc<ReturnItemService>,
}

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    observability::encode_metrics()
}

/// Build the full application router.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    let api = Router::new()
        .route("/remote-storage/retrievals", get(retrievals::list))
        .route("/remote-storage/retrievals/:id/retrieved", post(retrievals::mark_by_id))
        .route("/remote-storage/retrievals/barcode/:barcode/retrieved", post(retrievals::mark_by_barcode))
        .route("/remote-storage/return/:remote_storage_configuration_id", post(returns::return_item))
        .route("/remote-storage/events/item-moved", post(events::item_moved))
        .with_state(state);

    public
        .merge(api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
