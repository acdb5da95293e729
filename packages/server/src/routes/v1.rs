use axum::{
    Router,
    routing::{get, post},
};

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> Router<AppState> {
    let max_upload = config.storage.max_upload_size;

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/items", item_routes(max_upload))
        .nest("/categories", category_routes())
        .nest("/locations", location_routes())
        .nest("/search", search_routes(max_upload))
}

fn item_routes(max_upload: u64) -> Router<AppState> {
    let crud = Router::new()
        .route(
            "/",
            get(handlers::item::list_items).post(handlers::item::create_item),
        )
        .route(
            "/{id}",
            get(handlers::item::get_item)
                .patch(handlers::item::update_item)
                .delete(handlers::item::delete_item),
        )
        .route("/{id}/describe", post(handlers::item::describe_item))
        .route(
            "/{id}/images/{image_id}",
            get(handlers::image::get_image).delete(handlers::image::delete_image),
        )
        .route(
            "/{id}/images/{image_id}/file",
            get(handlers::image::download_image),
        );

    let upload = Router::new()
        .route(
            "/{id}/images",
            get(handlers::image::list_images).post(handlers::image::upload_image),
        )
        .layer(handlers::image::image_upload_body_limit(max_upload));

    crud.merge(upload)
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::category::list_categories).post(handlers::category::create_category),
        )
        .route(
            "/{id}",
            get(handlers::category::get_category)
                .patch(handlers::category::update_category)
                .delete(handlers::category::delete_category),
        )
}

fn location_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::location::list_locations).post(handlers::location::create_location),
        )
        .route(
            "/{id}",
            get(handlers::location::get_location)
                .patch(handlers::location::update_location)
                .delete(handlers::location::delete_location),
        )
}

fn search_routes(max_upload: u64) -> Router<AppState> {
    Router::new()
        .route("/items", get(handlers::search::search_text))
        .route(
            "/by-image",
            post(handlers::search::search_image)
                .layer(handlers::image::image_upload_body_limit(max_upload)),
        )
}
