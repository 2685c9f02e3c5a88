use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;
pub mod upload;

pub mod routes;
use auth::AuthUser;
use routes::{blog, category, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{ImageHostState, MockImageHost, S3ImageHost};

/// ApiDoc
///
/// OpenAPI document for every handler annotated with `#[utoipa::path]`,
/// served at `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::category::fetch_all_categories, handlers::category::add_category,
        handlers::category::update_category, handlers::category::delete_category,
        handlers::category::get_subcategories, handlers::category::add_subcategory,
        handlers::category::update_subcategory, handlers::category::delete_subcategory,
        handlers::category::add_tour, handlers::category::update_tour,
        handlers::category::delete_tour,
        handlers::blog::fetch_all_blogs, handlers::blog::add_blog,
        handlers::blog::update_blog, handlers::blog::delete_blog,
        handlers::blog::get_blog_subcategories, handlers::blog::add_blog_subcategory,
        handlers::blog::update_blog_subcategory, handlers::blog::delete_blog_subcategory,
    ),
    components(
        schemas(
            models::Category, models::Subcategory, models::Tour,
            models::Blog, models::BlogSubcategory,
            models::CreateCategoryRequest, models::UpdateCategoryRequest,
            models::SubcategoryFields, models::TourFields,
            models::CreateBlogRequest, models::BlogFields, models::BlogSubcategoryFields,
            models::MessageResponse, models::SuccessResponse,
            models::CategoryDeletedResponse, models::BlogDeletedResponse,
            models::SubcategoryResponse, models::TourResponse, models::BlogSubcategoryResponse,
            error::ErrorResponse, error::ValidationErrorResponse, error::FieldError,
        )
    ),
    tags(
        (name = "category", description = "Tour categories, subcategories and tours"),
        (name = "blog", description = "Blogs and their subcategories")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, cheaply clonable container for every service a handler may need.
#[derive(Clone)]
pub struct AppState {
    /// Aggregate store (Postgres in production, in-memory in tests).
    pub repo: RepositoryState,
    /// External media host receiving uploaded images.
    pub images: ImageHostState,
    pub config: AppConfig,
}

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for ImageHostState {
    fn from_ref(app_state: &AppState) -> ImageHostState {
        app_state.images.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards the `/api` routers. Extracting `AuthUser` validates the bearer token and
/// stores the identity in the request extensions; on failure the extractor
/// rejects with 401 and the handler never runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing tree, applies the auth guard to the API routes and
/// wraps everything in the request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");
    let body_limit = state.config.max_upload_bytes;

    let guard = || middleware::from_fn_with_state(state.clone(), auth_middleware);

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .nest(
            "/api/category",
            category::category_routes().route_layer(guard()),
        )
        .nest("/api/blog", blog::blog_routes().route_layer(guard()))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so every log line carries method, uri and request id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
