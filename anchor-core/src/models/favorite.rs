use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: String,
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub version: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFavoriteInput {
    pub user_id: String,
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub version: String,
    pub text: String,
}
