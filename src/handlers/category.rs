use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use super::{authorize, orphaned, upload_image, upload_images};
use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    extract::{ApiJson, ApiPath},
    models::{
        Category, CategoryDeletedResponse, CreateCategoryRequest, Subcategory, SubcategoryFields,
        SubcategoryImages, SubcategoryResponse, SuccessResponse, Tour, TourFields, TourResponse,
        UpdateCategoryRequest, merge_required,
    },
    upload::UploadForm,
};

/// Multipart field carrying a subcategory's primary image.
pub const SUBCATEGORY_IMAGE: &str = "subCatimage";
pub const ABOUT1_IMAGE: &str = "about1image";
pub const ABOUT2_IMAGE: &str = "about2image";
/// Multipart field carrying a tour's image.
pub const TOUR_IMAGE: &str = "image";

async fn load_category(
    state: &AppState,
    category_id: Uuid,
    user_id: Uuid,
) -> Result<Category, ApiError> {
    let category = state.repo.get_category(category_id).await?;
    authorize(category, user_id, "Category")
}

async fn upload_subcategory_images(
    state: &AppState,
    form: &UploadForm,
) -> Result<SubcategoryImages, ApiError> {
    let [image_url, about1_image_url, about2_image_url] =
        upload_images(state, form, [SUBCATEGORY_IMAGE, ABOUT1_IMAGE, ABOUT2_IMAGE]).await?;
    Ok(SubcategoryImages {
        image_url,
        about1_image_url,
        about2_image_url,
    })
}

// --- Category ---

/// fetch_all_categories
///
/// Lists every category owned by the requester, in creation order.
#[utoipa::path(
    get,
    path = "/api/category/fetchallcategory",
    tag = "category",
    responses((status = 200, description = "Categories owned by the requester", body = [Category]))
)]
pub async fn fetch_all_categories(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.repo.list_categories(user_id).await?))
}

/// add_category
///
/// Creates an empty category owned by the requester. The name must be at least
/// three characters long.
#[utoipa::path(
    post,
    path = "/api/category/addcategory",
    tag = "category",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Created", body = Category),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn add_category(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    payload.validate()?;

    let category = Category::new(user_id, payload.category);
    let saved = state.repo.insert_category(&category).await?;
    tracing::info!(category_id = %saved.id, %user_id, "category created");
    Ok(Json(saved))
}

/// update_category
///
/// Renames a category. An absent or empty name leaves it unchanged.
#[utoipa::path(
    put,
    path = "/api/category/updatecategory/{id}",
    tag = "category",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated", body = Category),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Concurrent modification")
    )
)]
pub async fn update_category(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let mut category = load_category(&state, id, user_id).await?;
    merge_required(&mut category.name, payload.category);
    Ok(Json(state.repo.save_category(&category).await?))
}

/// delete_category
///
/// Deletes a category together with all of its subcategories and tours.
#[utoipa::path(
    delete,
    path = "/api/category/deletecategory/{id}",
    tag = "category",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted", body = CategoryDeletedResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_category(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<CategoryDeletedResponse>, ApiError> {
    load_category(&state, id, user_id).await?;

    let category = state
        .repo
        .delete_category(id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category"))?;

    tracing::info!(category_id = %id, %user_id, "category deleted");
    Ok(Json(CategoryDeletedResponse {
        success: "Category has been deleted".to_string(),
        category,
    }))
}

// --- Subcategory ---

/// get_subcategories
#[utoipa::path(
    get,
    path = "/api/category/{category_id}/getsubcategory",
    tag = "category",
    params(("category_id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Subcategories", body = [Subcategory]),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_subcategories(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath(category_id): ApiPath<Uuid>,
) -> Result<Json<Vec<Subcategory>>, ApiError> {
    let category = load_category(&state, category_id, user_id).await?;
    Ok(Json(category.subcategories))
}

/// add_subcategory
///
/// Multipart: text fields plus the three required images `subCatimage`,
/// `about1image` and `about2image`. Nothing is uploaded unless all three are
/// present, and nothing is saved unless all three uploads succeed.
#[utoipa::path(
    post,
    path = "/api/category/{category_id}/subcategories",
    tag = "category",
    params(("category_id" = Uuid, Path, description = "Category ID")),
    request_body(content = SubcategoryFields, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Created", body = SubcategoryResponse),
        (status = 400, description = "Missing image or bad field"),
        (status = 404, description = "Category not found"),
        (status = 502, description = "Media host failure")
    )
)]
pub async fn add_subcategory(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath(category_id): ApiPath<Uuid>,
    form: UploadForm,
) -> Result<(StatusCode, Json<SubcategoryResponse>), ApiError> {
    let mut category = load_category(&state, category_id, user_id).await?;
    let fields: SubcategoryFields = form.parse()?;
    form.require_files(&[SUBCATEGORY_IMAGE, ABOUT1_IMAGE, ABOUT2_IMAGE])?;

    let images = upload_subcategory_images(&state, &form).await?;
    let uploaded = images.urls();
    let subcategory = Subcategory::new(fields, images);
    category.subcategories.push(subcategory.clone());
    state
        .repo
        .save_category(&category)
        .await
        .map_err(|e| orphaned(e, &uploaded))?;

    tracing::info!(%category_id, subcategory_id = %subcategory.id, "subcategory added");
    Ok((
        StatusCode::CREATED,
        Json(SubcategoryResponse {
            message: "Subcategory added successfully".to_string(),
            subcategory,
        }),
    ))
}

/// update_subcategory
///
/// Accepts multipart or JSON. Each image is replaced only when a new file is sent.
#[utoipa::path(
    put,
    path = "/api/category/{category_id}/subcategories/{subcategory_id}",
    tag = "category",
    params(
        ("category_id" = Uuid, Path, description = "Category ID"),
        ("subcategory_id" = Uuid, Path, description = "Subcategory ID")
    ),
    request_body(content = SubcategoryFields, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated", body = SubcategoryResponse),
        (status = 404, description = "Category or subcategory not found")
    )
)]
pub async fn update_subcategory(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath((category_id, subcategory_id)): ApiPath<(Uuid, Uuid)>,
    form: UploadForm,
) -> Result<Json<SubcategoryResponse>, ApiError> {
    let mut category = load_category(&state, category_id, user_id).await?;
    let fields: SubcategoryFields = form.parse()?;

    let subcategory = category
        .subcategory_mut(subcategory_id)
        .ok_or_else(|| ApiError::not_found("subcategory"))?;
    let images = upload_subcategory_images(&state, &form).await?;
    let uploaded = images.urls();
    subcategory.apply(fields, images);
    let subcategory = subcategory.clone();

    state
        .repo
        .save_category(&category)
        .await
        .map_err(|e| orphaned(e, &uploaded))?;
    Ok(Json(SubcategoryResponse {
        message: "subcategory updated successfully".to_string(),
        subcategory,
    }))
}

/// delete_subcategory
#[utoipa::path(
    delete,
    path = "/api/category/{category_id}/subcategories/{subcategory_id}",
    tag = "category",
    params(
        ("category_id" = Uuid, Path, description = "Category ID"),
        ("subcategory_id" = Uuid, Path, description = "Subcategory ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 404, description = "Category or subcategory not found")
    )
)]
pub async fn delete_subcategory(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath((category_id, subcategory_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let mut category = load_category(&state, category_id, user_id).await?;
    category
        .remove_subcategory(subcategory_id)
        .ok_or_else(|| ApiError::not_found("subcategory"))?;

    state.repo.save_category(&category).await?;
    Ok(Json(SuccessResponse::new("subcategory deleted successfully")))
}

// --- Tour ---

/// add_tour
///
/// Multipart: `name`, `day`, `description` and the required `image` file.
#[utoipa::path(
    post,
    path = "/api/category/{category_id}/subcategories/{subcategory_id}/tour",
    tag = "category",
    params(
        ("category_id" = Uuid, Path, description = "Category ID"),
        ("subcategory_id" = Uuid, Path, description = "Subcategory ID")
    ),
    request_body(content = TourFields, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Created", body = TourResponse),
        (status = 400, description = "Missing image"),
        (status = 404, description = "Category or subcategory not found")
    )
)]
pub async fn add_tour(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath((category_id, subcategory_id)): ApiPath<(Uuid, Uuid)>,
    form: UploadForm,
) -> Result<(StatusCode, Json<TourResponse>), ApiError> {
    let mut category = load_category(&state, category_id, user_id).await?;
    let fields: TourFields = form.parse()?;

    let subcategory = category
        .subcategory_mut(subcategory_id)
        .ok_or_else(|| ApiError::not_found("Subcategory"))?;
    form.require_files(&[TOUR_IMAGE])?;
    let image_url = upload_image(&state, &form, TOUR_IMAGE).await?;
    let uploaded: Vec<String> = image_url.iter().cloned().collect();

    let tour = Tour::new(fields, image_url);
    subcategory.tours.push(tour.clone());
    state
        .repo
        .save_category(&category)
        .await
        .map_err(|e| orphaned(e, &uploaded))?;

    tracing::info!(%category_id, %subcategory_id, tour_id = %tour.id, "tour added");
    Ok((
        StatusCode::CREATED,
        Json(TourResponse {
            message: "Tour added successfully".to_string(),
            tour,
        }),
    ))
}

/// update_tour
#[utoipa::path(
    put,
    path = "/api/category/{category_id}/subcategories/{subcategory_id}/tour/{tour_id}",
    tag = "category",
    params(
        ("category_id" = Uuid, Path, description = "Category ID"),
        ("subcategory_id" = Uuid, Path, description = "Subcategory ID"),
        ("tour_id" = Uuid, Path, description = "Tour ID")
    ),
    request_body(content = TourFields, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated", body = TourResponse),
        (status = 404, description = "Category, subcategory or tour not found")
    )
)]
pub async fn update_tour(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath((category_id, subcategory_id, tour_id)): ApiPath<(Uuid, Uuid, Uuid)>,
    form: UploadForm,
) -> Result<Json<TourResponse>, ApiError> {
    let mut category = load_category(&state, category_id, user_id).await?;
    let fields: TourFields = form.parse()?;

    let tour = category
        .subcategory_mut(subcategory_id)
        .ok_or_else(|| ApiError::not_found("Subcategory"))?
        .tour_mut(tour_id)
        .ok_or_else(|| ApiError::not_found("Tour"))?;
    let image_url = upload_image(&state, &form, TOUR_IMAGE).await?;
    let uploaded: Vec<String> = image_url.iter().cloned().collect();
    tour.apply(fields, image_url);
    let tour = tour.clone();

    state
        .repo
        .save_category(&category)
        .await
        .map_err(|e| orphaned(e, &uploaded))?;
    Ok(Json(TourResponse {
        message: "Tour updated successfully".to_string(),
        tour,
    }))
}

/// delete_tour
#[utoipa::path(
    delete,
    path = "/api/category/{category_id}/subcategories/{subcategory_id}/tour/{tour_id}",
    tag = "category",
    params(
        ("category_id" = Uuid, Path, description = "Category ID"),
        ("subcategory_id" = Uuid, Path, description = "Subcategory ID"),
        ("tour_id" = Uuid, Path, description = "Tour ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 404, description = "Category, subcategory or tour not found")
    )
)]
pub async fn delete_tour(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath((category_id, subcategory_id, tour_id)): ApiPath<(Uuid, Uuid, Uuid)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let mut category = load_category(&state, category_id, user_id).await?;
    category
        .subcategory_mut(subcategory_id)
        .ok_or_else(|| ApiError::not_found("Subcategory"))?
        .remove_tour(tour_id)
        .ok_or_else(|| ApiError::not_found("tour"))?;

    state.repo.save_category(&category).await?;
    Ok(Json(SuccessResponse::new("tour deleted successfully")))
}
