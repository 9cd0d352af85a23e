mod domain;

pub mod database;

// Persisted content field names

pub const ID_FIELD_NAME: &'static str = "id";
pub const SLUG_FIELD_NAME: &'static str = "slug";
pub const STATUS_FIELD_NAME: &'static str = "status";
pub const PUBLISH_AT_FIELD_NAME: &'static str = "publish_at";

pub const CREATED_FIELD_NAME: &'static str = "created_at";
pub const UPDATED_FIELD_NAME: &'static str = "updated_at";

// expose domain module

pub use domain::*;
