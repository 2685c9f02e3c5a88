use crate::{AppState, handlers::blog};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Blog Router Module
///
/// Mounted under `/api/blog`. Same shape as the category routes, one level
/// shallower: blogs hold a flat subcategory list.
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/fetchallblogs", get(blog::fetch_all_blogs))
        .route("/addblog", post(blog::add_blog))
        .route("/updateblog/{id}", put(blog::update_blog))
        .route("/deleteblog/{id}", delete(blog::delete_blog))
        .route("/{blog_id}/getsubcategory", get(blog::get_blog_subcategories))
        .route("/{blog_id}/subcategories", post(blog::add_blog_subcategory))
        .route(
            "/{blog_id}/subcategories/{subcategory_id}",
            put(blog::update_blog_subcategory).delete(blog::delete_blog_subcategory),
        )
}
