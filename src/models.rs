use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Ownership ---

/// Owned
///
/// Implemented by every top-level aggregate. Handlers compare `owner()` with the
/// authenticated user before returning or mutating anything.
pub trait Owned {
    fn owner(&self) -> Uuid;

    fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner() == user_id
    }
}

/// Overwrites `slot` only when `incoming` carries a non-empty value.
pub fn merge(slot: &mut Option<String>, incoming: Option<String>) {
    if let Some(value) = incoming.filter(|value| !value.is_empty()) {
        *slot = Some(value);
    }
}

/// Same as [`merge`] for a required field.
pub fn merge_required(slot: &mut String, incoming: Option<String>) {
    if let Some(value) = incoming.filter(|value| !value.is_empty()) {
        *slot = value;
    }
}

/// Removes the element whose id matches, keeping the relative order of the rest.
fn remove_by_id<T>(items: &mut Vec<T>, id: Uuid, key: impl Fn(&T) -> Uuid) -> Option<T> {
    let index = items.iter().position(|item| key(item) == id)?;
    Some(items.remove(index))
}

// --- Category Aggregate ---

/// Category
///
/// Top-level tour aggregate. Subcategories and their tours are stored inline and
/// persisted together with the category in a single write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub owner: Uuid,
    #[serde(rename = "category")]
    pub name: String,
    #[serde(rename = "date")]
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
    /// Optimistic-concurrency counter, bumped on every successful save.
    #[serde(rename = "__v", default)]
    pub version: i64,
}

impl Category {
    /// A fresh, empty category owned by `owner`.
    pub fn new(owner: Uuid, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            name,
            created_at: Utc::now(),
            subcategories: Vec::new(),
            version: 0,
        }
    }

    pub fn subcategory_mut(&mut self, id: Uuid) -> Option<&mut Subcategory> {
        self.subcategories.iter_mut().find(|sub| sub.id == id)
    }

    pub fn remove_subcategory(&mut self, id: Uuid) -> Option<Subcategory> {
        remove_by_id(&mut self.subcategories, id, |sub| sub.id)
    }
}

impl Owned for Category {
    fn owner(&self) -> Uuid {
        self.owner
    }
}

/// Subcategory
///
/// A destination inside a category. Carries three image URLs and an ordered tour list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Subcategory {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "subCategory", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "subCategorydesc", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(rename = "metaTag", default, skip_serializing_if = "Option::is_none")]
    pub meta_tag: Option<String>,
    #[serde(rename = "metaTitle", default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(rename = "metaDesc", default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(rename = "subCatimageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "about1imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub about1_image_url: Option<String>,
    #[serde(rename = "about2imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub about2_image_url: Option<String>,
    #[serde(rename = "tour", default)]
    pub tours: Vec<Tour>,
}

impl Subcategory {
    pub fn new(fields: SubcategoryFields, images: SubcategoryImages) -> Self {
        let mut subcategory = Self {
            id: Uuid::new_v4(),
            ..Self::default()
        };
        subcategory.apply(fields, images);
        subcategory
    }

    /// Patches every field present (and non-empty) in the request.
    pub fn apply(&mut self, fields: SubcategoryFields, images: SubcategoryImages) {
        merge(&mut self.name, fields.name);
        merge(&mut self.description, fields.description);
        merge(&mut self.location, fields.location);
        merge(&mut self.interval, fields.interval);
        merge(&mut self.meta_tag, fields.meta_tag);
        merge(&mut self.meta_title, fields.meta_title);
        merge(&mut self.meta_description, fields.meta_description);
        merge(&mut self.image_url, images.image_url);
        merge(&mut self.about1_image_url, images.about1_image_url);
        merge(&mut self.about2_image_url, images.about2_image_url);
    }

    pub fn tour_mut(&mut self, id: Uuid) -> Option<&mut Tour> {
        self.tours.iter_mut().find(|tour| tour.id == id)
    }

    pub fn remove_tour(&mut self, id: Uuid) -> Option<Tour> {
        remove_by_id(&mut self.tours, id, |tour| tour.id)
    }
}

/// Tour
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Tour {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "day", default, skip_serializing_if = "Option::is_none")]
    pub day_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Tour {
    pub fn new(fields: TourFields, image_url: Option<String>) -> Self {
        let mut tour = Self {
            id: Uuid::new_v4(),
            ..Self::default()
        };
        tour.apply(fields, image_url);
        tour
    }

    pub fn apply(&mut self, fields: TourFields, image_url: Option<String>) {
        merge(&mut self.name, fields.name);
        merge(&mut self.day_label, fields.day_label);
        merge(&mut self.description, fields.description);
        merge(&mut self.image_url, image_url);
    }
}

// --- Blog Aggregate ---

/// Blog
///
/// Top-level blog aggregate with a single flat subcategory list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Blog {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "user")]
    pub owner: Uuid,
    pub category: String,
    #[serde(rename = "categorydesc", default, skip_serializing_if = "Option::is_none")]
    pub category_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "days", default, skip_serializing_if = "Option::is_none")]
    pub day_label: Option<String>,
    pub tag: String,
    #[serde(rename = "catimageUrl", default, skip_serializing_if = "Option::is_none")]
    pub cat_image_url: Option<String>,
    #[serde(rename = "about1image", default, skip_serializing_if = "Option::is_none")]
    pub about1_image: Option<String>,
    #[serde(rename = "about2image", default, skip_serializing_if = "Option::is_none")]
    pub about2_image: Option<String>,
    #[serde(default)]
    pub subcategories: Vec<BlogSubcategory>,
    #[serde(rename = "date")]
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "__v", default)]
    pub version: i64,
}

impl Blog {
    pub fn new(owner: Uuid, request: CreateBlogRequest, images: BlogImages) -> Self {
        let mut blog = Self {
            id: Uuid::new_v4(),
            owner,
            category: request.category,
            category_description: None,
            address: None,
            day_label: None,
            tag: request.tag,
            cat_image_url: None,
            about1_image: None,
            about2_image: None,
            subcategories: Vec::new(),
            created_at: Utc::now(),
            version: 0,
        };
        blog.apply(
            BlogFields {
                category_description: request.category_description,
                address: request.address,
                day_label: request.day_label,
                ..BlogFields::default()
            },
            images,
        );
        blog
    }

    pub fn apply(&mut self, fields: BlogFields, images: BlogImages) {
        merge_required(&mut self.category, fields.category);
        merge(&mut self.category_description, fields.category_description);
        merge(&mut self.address, fields.address);
        merge(&mut self.day_label, fields.day_label);
        merge_required(&mut self.tag, fields.tag);
        merge(&mut self.cat_image_url, images.cat_image_url);
        merge(&mut self.about1_image, images.about1_image);
        merge(&mut self.about2_image, images.about2_image);
    }

    pub fn subcategory_mut(&mut self, id: Uuid) -> Option<&mut BlogSubcategory> {
        self.subcategories.iter_mut().find(|sub| sub.id == id)
    }

    pub fn remove_subcategory(&mut self, id: Uuid) -> Option<BlogSubcategory> {
        remove_by_id(&mut self.subcategories, id, |sub| sub.id)
    }
}

impl Owned for Blog {
    fn owner(&self) -> Uuid {
        self.owner
    }
}

/// BlogSubcategory
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct BlogSubcategory {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "subDays", default, skip_serializing_if = "Option::is_none")]
    pub sub_days: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl BlogSubcategory {
    pub fn new(fields: BlogSubcategoryFields, image_url: Option<String>) -> Self {
        let mut subcategory = Self {
            id: Uuid::new_v4(),
            ..Self::default()
        };
        subcategory.apply(fields, image_url);
        subcategory
    }

    pub fn apply(&mut self, fields: BlogSubcategoryFields, image_url: Option<String>) {
        merge(&mut self.name, fields.name);
        merge(&mut self.sub_days, fields.sub_days);
        merge(&mut self.description, fields.description);
        merge(&mut self.image_url, image_url);
    }
}

// --- Request Payloads ---

/// CreateCategoryRequest
///
/// JSON body of `POST /api/category/addcategory`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    #[validate(length(min = 3, message = "Enter a valid category"))]
    pub category: String,
}

/// UpdateCategoryRequest
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateCategoryRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// SubcategoryFields
///
/// Text parts of the subcategory create/update forms. Absent or empty parts leave
/// the stored value untouched on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SubcategoryFields {
    #[serde(rename = "subCategory", default)]
    pub name: Option<String>,
    #[serde(rename = "subCategorydesc", default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(rename = "metaTag", default)]
    pub meta_tag: Option<String>,
    #[serde(rename = "metaTitle", default)]
    pub meta_title: Option<String>,
    #[serde(rename = "metaDesc", default)]
    pub meta_description: Option<String>,
}

/// Uploaded URLs for the three subcategory image slots.
#[derive(Debug, Clone, Default)]
pub struct SubcategoryImages {
    pub image_url: Option<String>,
    pub about1_image_url: Option<String>,
    pub about2_image_url: Option<String>,
}

impl SubcategoryImages {
    /// The URLs actually uploaded, in slot order.
    pub fn urls(&self) -> Vec<String> {
        [&self.image_url, &self.about1_image_url, &self.about2_image_url]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

/// TourFields
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TourFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "day", default)]
    pub day_label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// CreateBlogRequest
///
/// Text parts of `POST /api/blog/addblog`; `category` and `tag` are mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS, ToSchema)]
#[ts(export)]
pub struct CreateBlogRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Enter a valid category"))]
    pub category: String,
    #[serde(rename = "categorydesc", default)]
    pub category_description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(rename = "days", default)]
    pub day_label: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Enter a valid tag"))]
    pub tag: String,
}

/// BlogFields
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct BlogFields {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "categorydesc", default)]
    pub category_description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(rename = "days", default)]
    pub day_label: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

/// Uploaded URLs for the three blog image slots.
#[derive(Debug, Clone, Default)]
pub struct BlogImages {
    pub cat_image_url: Option<String>,
    pub about1_image: Option<String>,
    pub about2_image: Option<String>,
}

impl BlogImages {
    pub fn urls(&self) -> Vec<String> {
        [&self.cat_image_url, &self.about1_image, &self.about2_image]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

/// BlogSubcategoryFields
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct BlogSubcategoryFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "subDays", default)]
    pub sub_days: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// --- Response Envelopes ---

/// `{ "message": ... }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// `{ "Success": ... }`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    #[serde(rename = "Success")]
    pub success: String,
}

impl SuccessResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryDeletedResponse {
    #[serde(rename = "Success")]
    pub success: String,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogDeletedResponse {
    #[serde(rename = "Success")]
    pub success: String,
    pub blog: Blog,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubcategoryResponse {
    pub message: String,
    pub subcategory: Subcategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TourResponse {
    pub message: String,
    pub tour: Tour,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogSubcategoryResponse {
    pub message: String,
    pub subcategory: BlogSubcategory,
}
