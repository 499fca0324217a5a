use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A curated background image. `name` doubles as the de-dup key during
/// ingestion; removal is soft via `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePreset {
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub category: String,
    pub tags: Vec<String>,
    pub sort_order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePresetInput {
    pub name: String,
    pub image_url: String,
    pub category: String,
    pub tags: Option<Vec<String>>,
    pub sort_order: Option<i64>,
}
