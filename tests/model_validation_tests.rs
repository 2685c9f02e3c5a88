use serde_json::json;
use tour_cms::models::{
    Blog, BlogFields, BlogImages, Category, CreateBlogRequest, CreateCategoryRequest, Subcategory,
    SubcategoryFields, SubcategoryImages, Tour, TourFields, merge, merge_required,
};
use uuid::Uuid;
use validator::Validate;

fn tour(name: &str) -> Tour {
    Tour::new(
        TourFields {
            name: Some(name.to_string()),
            ..TourFields::default()
        },
        Some(format!("http://img/{name}.png")),
    )
}

// --- Merge semantics ---

#[test]
fn test_merge_keeps_value_on_absent_or_empty() {
    let mut slot = Some("Alps".to_string());

    merge(&mut slot, None);
    assert_eq!(slot.as_deref(), Some("Alps"));

    merge(&mut slot, Some(String::new()));
    assert_eq!(slot.as_deref(), Some("Alps"));

    merge(&mut slot, Some("Andes".to_string()));
    assert_eq!(slot.as_deref(), Some("Andes"));
}

#[test]
fn test_merge_required_overwrites_only_non_empty() {
    let mut name = "Hiking".to_string();

    merge_required(&mut name, Some(String::new()));
    assert_eq!(name, "Hiking");

    merge_required(&mut name, Some("Trekking".to_string()));
    assert_eq!(name, "Trekking");
}

#[test]
fn test_subcategory_apply_keeps_images_without_new_files() {
    let mut sub = Subcategory::new(
        SubcategoryFields {
            name: Some("Everest".to_string()),
            location: Some("Nepal".to_string()),
            ..SubcategoryFields::default()
        },
        SubcategoryImages {
            image_url: Some("http://img/main.png".to_string()),
            about1_image_url: Some("http://img/a1.png".to_string()),
            about2_image_url: Some("http://img/a2.png".to_string()),
        },
    );

    sub.apply(
        SubcategoryFields {
            location: Some("Tibet".to_string()),
            meta_tag: Some(String::new()),
            ..SubcategoryFields::default()
        },
        SubcategoryImages {
            about2_image_url: Some("http://img/a2-new.png".to_string()),
            ..SubcategoryImages::default()
        },
    );

    assert_eq!(sub.name.as_deref(), Some("Everest"));
    assert_eq!(sub.location.as_deref(), Some("Tibet"));
    assert_eq!(sub.meta_tag, None);
    assert_eq!(sub.image_url.as_deref(), Some("http://img/main.png"));
    assert_eq!(sub.about1_image_url.as_deref(), Some("http://img/a1.png"));
    assert_eq!(sub.about2_image_url.as_deref(), Some("http://img/a2-new.png"));
}

// --- Aggregate structure ---

#[test]
fn test_new_category_is_empty_and_unversioned() {
    let owner = Uuid::new_v4();
    let category = Category::new(owner, "Hiking".to_string());

    assert_eq!(category.owner, owner);
    assert_eq!(category.name, "Hiking");
    assert!(category.subcategories.is_empty());
    assert_eq!(category.version, 0);
}

#[test]
fn test_remove_tour_preserves_order() {
    let mut sub = Subcategory::new(SubcategoryFields::default(), SubcategoryImages::default());
    sub.tours = vec![tour("a"), tour("b"), tour("c")];
    let middle = sub.tours[1].id;

    let removed = sub.remove_tour(middle).unwrap();

    assert_eq!(removed.name.as_deref(), Some("b"));
    let names: Vec<_> = sub.tours.iter().map(|t| t.name.clone().unwrap()).collect();
    assert_eq!(names, vec!["a", "c"]);
}

#[test]
fn test_remove_unknown_id_is_noop() {
    let mut category = Category::new(Uuid::new_v4(), "Hiking".to_string());
    category.subcategories.push(Subcategory::new(
        SubcategoryFields::default(),
        SubcategoryImages::default(),
    ));

    assert!(category.remove_subcategory(Uuid::new_v4()).is_none());
    assert_eq!(category.subcategories.len(), 1);
}

#[test]
fn test_blog_new_and_apply() {
    let owner = Uuid::new_v4();
    let mut blog = Blog::new(
        owner,
        CreateBlogRequest {
            category: "Food".to_string(),
            tag: "street".to_string(),
            address: Some("Bangkok".to_string()),
            ..CreateBlogRequest::default()
        },
        BlogImages {
            cat_image_url: Some("http://img/cat.png".to_string()),
            ..BlogImages::default()
        },
    );

    assert_eq!(blog.owner, owner);
    assert_eq!(blog.address.as_deref(), Some("Bangkok"));
    assert_eq!(blog.cat_image_url.as_deref(), Some("http://img/cat.png"));

    blog.apply(
        BlogFields {
            category: Some("Street Food".to_string()),
            tag: Some(String::new()),
            ..BlogFields::default()
        },
        BlogImages::default(),
    );

    assert_eq!(blog.category, "Street Food");
    assert_eq!(blog.tag, "street");
    assert_eq!(blog.cat_image_url.as_deref(), Some("http://img/cat.png"));
}

// --- Validation ---

#[test]
fn test_category_name_needs_three_characters() {
    let short = CreateCategoryRequest {
        category: "ab".to_string(),
    };
    let errors = short.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("category"));

    let ok = CreateCategoryRequest {
        category: "abc".to_string(),
    };
    assert!(ok.validate().is_ok());
}

#[test]
fn test_blog_requires_category_and_tag() {
    let errors = CreateBlogRequest::default().validate().unwrap_err();
    let fields = errors.field_errors();

    assert!(fields.contains_key("category"));
    assert!(fields.contains_key("tag"));
}

// --- Wire format ---

#[test]
fn test_category_wire_names() {
    let mut category = Category::new(Uuid::new_v4(), "Hiking".to_string());
    let mut sub = Subcategory::new(
        SubcategoryFields {
            name: Some("Everest".to_string()),
            meta_description: Some("High".to_string()),
            ..SubcategoryFields::default()
        },
        SubcategoryImages {
            image_url: Some("http://img/main.png".to_string()),
            ..SubcategoryImages::default()
        },
    );
    sub.tours.push(tour("Base Camp"));
    category.subcategories.push(sub);

    let value = serde_json::to_value(&category).unwrap();

    assert_eq!(value["_id"], json!(category.id));
    assert_eq!(value["user"], json!(category.owner));
    assert_eq!(value["category"], "Hiking");
    assert_eq!(value["__v"], 0);
    assert!(value["date"].is_string());

    let sub = &value["subcategories"][0];
    assert_eq!(sub["subCategory"], "Everest");
    assert_eq!(sub["metaDesc"], "High");
    assert_eq!(sub["subCatimageUrl"], "http://img/main.png");
    assert!(sub.get("about1imageUrl").is_none());
    assert_eq!(sub["tour"][0]["name"], "Base Camp");
    assert_eq!(sub["tour"][0]["imageUrl"], "http://img/Base Camp.png");
}

#[test]
fn test_form_fields_deserialize_from_wire_names() {
    let fields: SubcategoryFields = serde_json::from_value(json!({
        "subCategory": "Everest",
        "subCategorydesc": "Roof of the world",
        "metaTitle": "Everest tours",
        "unknown": "ignored"
    }))
    .unwrap();

    assert_eq!(fields.name.as_deref(), Some("Everest"));
    assert_eq!(fields.description.as_deref(), Some("Roof of the world"));
    assert_eq!(fields.meta_title.as_deref(), Some("Everest tours"));
    assert_eq!(fields.location, None);

    let tour: TourFields = serde_json::from_value(json!({ "day": "Day 1" })).unwrap();
    assert_eq!(tour.day_label.as_deref(), Some("Day 1"));
}
