pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventory API",
        version = "1.0.0",
        description = "Personal inventory catalog with text and colour-histogram image search"
    ),
    paths(
        handlers::health::health,
        handlers::item::create_item,
        handlers::item::list_items,
        handlers::item::get_item,
        handlers::item::update_item,
        handlers::item::delete_item,
        handlers::item::describe_item,
        handlers::image::upload_image,
        handlers::image::list_images,
        handlers::image::get_image,
        handlers::image::download_image,
        handlers::image::delete_image,
        handlers::category::create_category,
        handlers::category::list_categories,
        handlers::category::get_category,
        handlers::category::update_category,
        handlers::category::delete_category,
        handlers::location::create_location,
        handlers::location::list_locations,
        handlers::location::get_location,
        handlers::location::update_location,
        handlers::location::delete_location,
        handlers::search::search_text,
        handlers::search::search_image,
    ),
    components(schemas(error::ErrorBody)),
    tags(
        (name = "Items", description = "Item CRUD operations"),
        (name = "Item Images", description = "Image upload, analysis and retrieval"),
        (name = "Categories", description = "Category hierarchy"),
        (name = "Locations", description = "Storage locations"),
        (name = "Search", description = "Text and visual similarity search"),
        (name = "Health", description = "Service status"),
    ),
)]
pub struct ApiDoc;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(config.max_age))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);

    axum::Router::new()
        .nest("/api", routes::api_routes(&state.config))
        .with_state(state)
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route(
            "/api-docs/openapi.json",
            axum::routing::get(|| async { axum::Json(ApiDoc::openapi()) }),
        )
        .layer(cors)
}
