use crate::{
    error::RepositoryError,
    models::{Blog, BlogSubcategory, Category, Subcategory},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, types::Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Repository Trait
///
/// Aggregate store. Categories and blogs are loaded and saved whole: nested
/// subcategories and tours travel inside the document, never on their own.
///
/// `save_*` is optimistic: it succeeds only when the stored `version` still equals
/// the version that was loaded, and returns the aggregate with the bumped version.
/// A mismatch (or a concurrent delete) yields `RepositoryError::VersionConflict`.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Categories ---
    async fn list_categories(&self, owner: Uuid) -> Result<Vec<Category>, RepositoryError>;
    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, RepositoryError>;
    async fn insert_category(&self, category: &Category) -> Result<Category, RepositoryError>;
    async fn save_category(&self, category: &Category) -> Result<Category, RepositoryError>;
    // Owner-only: deletes nothing unless `owner` matches.
    async fn delete_category(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Category>, RepositoryError>;

    // --- Blogs ---
    async fn list_blogs(&self, owner: Uuid) -> Result<Vec<Blog>, RepositoryError>;
    async fn get_blog(&self, id: Uuid) -> Result<Option<Blog>, RepositoryError>;
    async fn insert_blog(&self, blog: &Blog) -> Result<Blog, RepositoryError>;
    async fn save_blog(&self, blog: &Blog) -> Result<Blog, RepositoryError>;
    async fn delete_blog(&self, id: Uuid, owner: Uuid) -> Result<Option<Blog>, RepositoryError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

// --- Postgres ---

#[derive(FromRow)]
struct CategoryRow {
    id: Uuid,
    user_id: Uuid,
    category: String,
    subcategories: Json<Vec<Subcategory>>,
    created_at: DateTime<Utc>,
    version: i64,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            owner: row.user_id,
            name: row.category,
            created_at: row.created_at,
            subcategories: row.subcategories.0,
            version: row.version,
        }
    }
}

#[derive(FromRow)]
struct BlogRow {
    id: Uuid,
    user_id: Uuid,
    category: String,
    categorydesc: Option<String>,
    address: Option<String>,
    days: Option<String>,
    tag: String,
    catimage_url: Option<String>,
    about1image: Option<String>,
    about2image: Option<String>,
    subcategories: Json<Vec<BlogSubcategory>>,
    created_at: DateTime<Utc>,
    version: i64,
}

impl From<BlogRow> for Blog {
    fn from(row: BlogRow) -> Self {
        Self {
            id: row.id,
            owner: row.user_id,
            category: row.category,
            category_description: row.categorydesc,
            address: row.address,
            day_label: row.days,
            tag: row.tag,
            cat_image_url: row.catimage_url,
            about1_image: row.about1image,
            about2_image: row.about2image,
            subcategories: row.subcategories.0,
            created_at: row.created_at,
            version: row.version,
        }
    }
}

const CATEGORY_COLUMNS: &str = "id, user_id, category, subcategories, created_at, version";
const BLOG_COLUMNS: &str = "id, user_id, category, categorydesc, address, days, tag, \
     catimage_url, about1image, about2image, subcategories, created_at, version";

/// PostgresRepository
///
/// Each aggregate is one row; the nested lists live in a JSONB column so a save
/// rewrites the whole document in a single statement.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_categories(&self, owner: Uuid) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Category::from))
    }

    async fn insert_category(&self, category: &Category) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "INSERT INTO categories (id, user_id, category, subcategories, created_at, version) \
             VALUES ($1, $2, $3, $4, $5, 0) RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(category.id)
        .bind(category.owner)
        .bind(&category.name)
        .bind(Json(&category.subcategories))
        .bind(category.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    /// Whole-document write guarded by the version the caller loaded.
    async fn save_category(&self, category: &Category) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE categories SET category = $3, subcategories = $4, version = version + 1 \
             WHERE id = $1 AND version = $2 RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(category.id)
        .bind(category.version)
        .bind(&category.name)
        .bind(Json(&category.subcategories))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Category::from)
            .ok_or(RepositoryError::VersionConflict(category.id))
    }

    async fn delete_category(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "DELETE FROM categories WHERE id = $1 AND user_id = $2 RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Category::from))
    }

    async fn list_blogs(&self, owner: Uuid) -> Result<Vec<Blog>, RepositoryError> {
        let rows = sqlx::query_as::<_, BlogRow>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs WHERE user_id = $1 ORDER BY created_at ASC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Blog::from).collect())
    }

    async fn get_blog(&self, id: Uuid) -> Result<Option<Blog>, RepositoryError> {
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            "SELECT {BLOG_COLUMNS} FROM blogs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Blog::from))
    }

    async fn insert_blog(&self, blog: &Blog) -> Result<Blog, RepositoryError> {
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            "INSERT INTO blogs (id, user_id, category, categorydesc, address, days, tag, \
             catimage_url, about1image, about2image, subcategories, created_at, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 0) RETURNING {BLOG_COLUMNS}"
        ))
        .bind(blog.id)
        .bind(blog.owner)
        .bind(&blog.category)
        .bind(&blog.category_description)
        .bind(&blog.address)
        .bind(&blog.day_label)
        .bind(&blog.tag)
        .bind(&blog.cat_image_url)
        .bind(&blog.about1_image)
        .bind(&blog.about2_image)
        .bind(Json(&blog.subcategories))
        .bind(blog.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn save_blog(&self, blog: &Blog) -> Result<Blog, RepositoryError> {
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            "UPDATE blogs SET category = $3, categorydesc = $4, address = $5, days = $6, \
             tag = $7, catimage_url = $8, about1image = $9, about2image = $10, \
             subcategories = $11, version = version + 1 \
             WHERE id = $1 AND version = $2 RETURNING {BLOG_COLUMNS}"
        ))
        .bind(blog.id)
        .bind(blog.version)
        .bind(&blog.category)
        .bind(&blog.category_description)
        .bind(&blog.address)
        .bind(&blog.day_label)
        .bind(&blog.tag)
        .bind(&blog.cat_image_url)
        .bind(&blog.about1_image)
        .bind(&blog.about2_image)
        .bind(Json(&blog.subcategories))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Blog::from)
            .ok_or(RepositoryError::VersionConflict(blog.id))
    }

    async fn delete_blog(&self, id: Uuid, owner: Uuid) -> Result<Option<Blog>, RepositoryError> {
        let row = sqlx::query_as::<_, BlogRow>(&format!(
            "DELETE FROM blogs WHERE id = $1 AND user_id = $2 RETURNING {BLOG_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Blog::from))
    }
}

// --- In-Memory ---

/// InMemoryRepository
///
/// Process-local store with the same versioning rules as Postgres. Used by the
/// test suite and for running the API without a database.
#[derive(Default)]
pub struct InMemoryRepository {
    categories: RwLock<Vec<Category>>,
    blogs: RwLock<Vec<Blog>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Replaces the stored copy of `incoming` if its version still matches.
fn swap_versioned<T: Clone>(
    items: &mut [T],
    id: Uuid,
    version: i64,
    incoming: &T,
    key: impl Fn(&T) -> (Uuid, i64),
    bump: impl Fn(&mut T, i64),
) -> Result<T, RepositoryError> {
    let slot = items
        .iter_mut()
        .find(|item| key(item) == (id, version))
        .ok_or(RepositoryError::VersionConflict(id))?;
    let mut updated = incoming.clone();
    bump(&mut updated, version + 1);
    *slot = updated.clone();
    Ok(updated)
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_categories(&self, owner: Uuid) -> Result<Vec<Category>, RepositoryError> {
        let categories = self.categories.read().await;
        Ok(categories
            .iter()
            .filter(|category| category.owner == owner)
            .cloned()
            .collect())
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>, RepositoryError> {
        let categories = self.categories.read().await;
        Ok(categories.iter().find(|category| category.id == id).cloned())
    }

    async fn insert_category(&self, category: &Category) -> Result<Category, RepositoryError> {
        let mut stored = category.clone();
        stored.version = 0;
        self.categories.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn save_category(&self, category: &Category) -> Result<Category, RepositoryError> {
        let mut categories = self.categories.write().await;
        swap_versioned(
            &mut categories,
            category.id,
            category.version,
            category,
            |c| (c.id, c.version),
            |c, v| c.version = v,
        )
    }

    async fn delete_category(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Category>, RepositoryError> {
        let mut categories = self.categories.write().await;
        let index = categories
            .iter()
            .position(|category| category.id == id && category.owner == owner);
        Ok(index.map(|index| categories.remove(index)))
    }

    async fn list_blogs(&self, owner: Uuid) -> Result<Vec<Blog>, RepositoryError> {
        let blogs = self.blogs.read().await;
        Ok(blogs.iter().filter(|blog| blog.owner == owner).cloned().collect())
    }

    async fn get_blog(&self, id: Uuid) -> Result<Option<Blog>, RepositoryError> {
        let blogs = self.blogs.read().await;
        Ok(blogs.iter().find(|blog| blog.id == id).cloned())
    }

    async fn insert_blog(&self, blog: &Blog) -> Result<Blog, RepositoryError> {
        let mut stored = blog.clone();
        stored.version = 0;
        self.blogs.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn save_blog(&self, blog: &Blog) -> Result<Blog, RepositoryError> {
        let mut blogs = self.blogs.write().await;
        swap_versioned(
            &mut blogs,
            blog.id,
            blog.version,
            blog,
            |b| (b.id, b.version),
            |b, v| b.version = v,
        )
    }

    async fn delete_blog(&self, id: Uuid, owner: Uuid) -> Result<Option<Blog>, RepositoryError> {
        let mut blogs = self.blogs.write().await;
        let index = blogs
            .iter()
            .position(|blog| blog.id == id && blog.owner == owner);
        Ok(index.map(|index| blogs.remove(index)))
    }
}
