/// Router Module Index
///
/// Routes are split by access level. Everything outside `public` sits behind
/// the authentication layer applied in `create_router`.

/// Unauthenticated routes: welcome message and health check.
pub mod public;

/// `/api/category/*`: categories, their subcategories and tours.
pub mod category;

/// `/api/blog/*`: blogs and their subcategories.
pub mod blog;
