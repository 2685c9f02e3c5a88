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
    extract::ApiPath,
    models::{
        Blog, BlogDeletedResponse, BlogFields, BlogImages, BlogSubcategory,
        BlogSubcategoryFields, BlogSubcategoryResponse, CreateBlogRequest, SuccessResponse,
    },
    upload::UploadForm,
};

pub const CAT_IMAGE: &str = "catimage";
pub const ABOUT1_IMAGE: &str = "about1image";
pub const ABOUT2_IMAGE: &str = "about2image";
pub const SUBCATEGORY_IMAGE: &str = "image";

async fn load_blog(state: &AppState, blog_id: Uuid, user_id: Uuid) -> Result<Blog, ApiError> {
    let blog = state.repo.get_blog(blog_id).await?;
    authorize(blog, user_id, "Blog")
}

async fn upload_blog_images(state: &AppState, form: &UploadForm) -> Result<BlogImages, ApiError> {
    let [cat_image_url, about1_image, about2_image] =
        upload_images(state, form, [CAT_IMAGE, ABOUT1_IMAGE, ABOUT2_IMAGE]).await?;
    Ok(BlogImages {
        cat_image_url,
        about1_image,
        about2_image,
    })
}

/// fetch_all_blogs
#[utoipa::path(
    get,
    path = "/api/blog/fetchallblogs",
    tag = "blog",
    responses((status = 200, description = "Blogs owned by the requester", body = [Blog]))
)]
pub async fn fetch_all_blogs(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Blog>>, ApiError> {
    Ok(Json(state.repo.list_blogs(user_id).await?))
}

/// add_blog
///
/// Multipart: `category` and `tag` are required text fields; `catimage`,
/// `about1image` and `about2image` are required files.
#[utoipa::path(
    post,
    path = "/api/blog/addblog",
    tag = "blog",
    request_body(content = CreateBlogRequest, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Created", body = Blog),
        (status = 400, description = "Validation failed"),
        (status = 502, description = "Media host failure")
    )
)]
pub async fn add_blog(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    form: UploadForm,
) -> Result<Json<Blog>, ApiError> {
    let request: CreateBlogRequest = form.parse()?;
    request.validate()?;
    form.require_files(&[CAT_IMAGE, ABOUT1_IMAGE, ABOUT2_IMAGE])?;

    let images = upload_blog_images(&state, &form).await?;
    let uploaded = images.urls();
    let blog = Blog::new(user_id, request, images);
    let saved = state
        .repo
        .insert_blog(&blog)
        .await
        .map_err(|e| orphaned(e, &uploaded))?;

    tracing::info!(blog_id = %saved.id, %user_id, "blog created");
    Ok(Json(saved))
}

/// update_blog
///
/// Multipart or JSON; absent fields and files keep their stored values.
#[utoipa::path(
    put,
    path = "/api/blog/updateblog/{id}",
    tag = "blog",
    params(("id" = Uuid, Path, description = "Blog ID")),
    request_body(content = BlogFields, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated", body = Blog),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_blog(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    form: UploadForm,
) -> Result<Json<Blog>, ApiError> {
    let mut blog = load_blog(&state, id, user_id).await?;
    let fields: BlogFields = form.parse()?;

    let images = upload_blog_images(&state, &form).await?;
    let uploaded = images.urls();
    blog.apply(fields, images);
    let saved = state
        .repo
        .save_blog(&blog)
        .await
        .map_err(|e| orphaned(e, &uploaded))?;
    Ok(Json(saved))
}

/// delete_blog
#[utoipa::path(
    delete,
    path = "/api/blog/deleteblog/{id}",
    tag = "blog",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Deleted", body = BlogDeletedResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_blog(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<BlogDeletedResponse>, ApiError> {
    load_blog(&state, id, user_id).await?;

    let blog = state
        .repo
        .delete_blog(id, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Blog"))?;

    tracing::info!(blog_id = %id, %user_id, "blog deleted");
    Ok(Json(BlogDeletedResponse {
        success: "Blog has been deleted".to_string(),
        blog,
    }))
}

/// get_blog_subcategories
#[utoipa::path(
    get,
    path = "/api/blog/{blog_id}/getsubcategory",
    tag = "blog",
    params(("blog_id" = Uuid, Path, description = "Blog ID")),
    responses((status = 200, description = "Subcategories", body = [BlogSubcategory]))
)]
pub async fn get_blog_subcategories(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath(blog_id): ApiPath<Uuid>,
) -> Result<Json<Vec<BlogSubcategory>>, ApiError> {
    let blog = load_blog(&state, blog_id, user_id).await?;
    Ok(Json(blog.subcategories))
}

/// add_blog_subcategory
///
/// Multipart: `name`, `subDays`, `description` and the required `image` file.
#[utoipa::path(
    post,
    path = "/api/blog/{blog_id}/subcategories",
    tag = "blog",
    params(("blog_id" = Uuid, Path, description = "Blog ID")),
    request_body(content = BlogSubcategoryFields, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Created", body = BlogSubcategoryResponse),
        (status = 400, description = "Missing image"),
        (status = 404, description = "Blog not found")
    )
)]
pub async fn add_blog_subcategory(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath(blog_id): ApiPath<Uuid>,
    form: UploadForm,
) -> Result<(StatusCode, Json<BlogSubcategoryResponse>), ApiError> {
    let mut blog = load_blog(&state, blog_id, user_id).await?;
    let fields: BlogSubcategoryFields = form.parse()?;
    form.require_files(&[SUBCATEGORY_IMAGE])?;

    let image_url = upload_image(&state, &form, SUBCATEGORY_IMAGE).await?;
    let uploaded: Vec<String> = image_url.iter().cloned().collect();
    let subcategory = BlogSubcategory::new(fields, image_url);
    blog.subcategories.push(subcategory.clone());
    state
        .repo
        .save_blog(&blog)
        .await
        .map_err(|e| orphaned(e, &uploaded))?;

    Ok((
        StatusCode::CREATED,
        Json(BlogSubcategoryResponse {
            message: "Subcategory added successfully".to_string(),
            subcategory,
        }),
    ))
}

/// update_blog_subcategory
#[utoipa::path(
    put,
    path = "/api/blog/{blog_id}/subcategories/{subcategory_id}",
    tag = "blog",
    params(
        ("blog_id" = Uuid, Path, description = "Blog ID"),
        ("subcategory_id" = Uuid, Path, description = "Subcategory ID")
    ),
    request_body(content = BlogSubcategoryFields, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Updated", body = BlogSubcategoryResponse),
        (status = 404, description = "Blog or subcategory not found")
    )
)]
pub async fn update_blog_subcategory(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath((blog_id, subcategory_id)): ApiPath<(Uuid, Uuid)>,
    form: UploadForm,
) -> Result<Json<BlogSubcategoryResponse>, ApiError> {
    let mut blog = load_blog(&state, blog_id, user_id).await?;
    let fields: BlogSubcategoryFields = form.parse()?;

    let subcategory = blog
        .subcategory_mut(subcategory_id)
        .ok_or_else(|| ApiError::not_found("subcategory"))?;
    let image_url = upload_image(&state, &form, SUBCATEGORY_IMAGE).await?;
    let uploaded: Vec<String> = image_url.iter().cloned().collect();
    subcategory.apply(fields, image_url);
    let subcategory = subcategory.clone();

    state
        .repo
        .save_blog(&blog)
        .await
        .map_err(|e| orphaned(e, &uploaded))?;
    Ok(Json(BlogSubcategoryResponse {
        message: "subcategory updated successfully".to_string(),
        subcategory,
    }))
}

/// delete_blog_subcategory
#[utoipa::path(
    delete,
    path = "/api/blog/{blog_id}/subcategories/{subcategory_id}",
    tag = "blog",
    params(
        ("blog_id" = Uuid, Path, description = "Blog ID"),
        ("subcategory_id" = Uuid, Path, description = "Subcategory ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = SuccessResponse),
        (status = 404, description = "Blog or subcategory not found")
    )
)]
pub async fn delete_blog_subcategory(
    AuthUser { id: user_id }: AuthUser,
    State(state): State<AppState>,
    ApiPath((blog_id, subcategory_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let mut blog = load_blog(&state, blog_id, user_id).await?;
    blog.remove_subcategory(subcategory_id)
        .ok_or_else(|| ApiError::not_found("subcategory"))?;

    state.repo.save_blog(&blog).await?;
    Ok(Json(SuccessResponse::new("subcategory deleted successfully")))
}
