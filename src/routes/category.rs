use crate::{AppState, handlers::category};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Category Router Module
///
/// Mounted under `/api/category`. Every route requires a valid bearer token and
/// every handler checks that the requester owns the category it touches,
/// including the nested subcategory and tour routes.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/fetchallcategory", get(category::fetch_all_categories))
        .route("/addcategory", post(category::add_category))
        .route("/updatecategory/{id}", put(category::update_category))
        .route("/deletecategory/{id}", delete(category::delete_category))
        // --- Subcategories ---
        .route(
            "/{category_id}/getsubcategory",
            get(category::get_subcategories),
        )
        .route(
            "/{category_id}/subcategories",
            post(category::add_subcategory),
        )
        .route(
            "/{category_id}/subcategories/{subcategory_id}",
            put(category::update_subcategory).delete(category::delete_subcategory),
        )
        // --- Tours ---
        .route(
            "/{category_id}/subcategories/{subcategory_id}/tour",
            post(category::add_tour),
        )
        .route(
            "/{category_id}/subcategories/{subcategory_id}/tour/{tour_id}",
            put(category::update_tour).delete(category::delete_tour),
        )
}
