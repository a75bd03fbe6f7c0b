use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One available rendition of a remote photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub width: u32,
    pub height: u32,
    pub url: String,
}

impl Variant {
    pub fn new(width: u32, height: u32, url: impl Into<String>) -> Self {
        Self {
            width,
            height,
            url: url.into(),
        }
    }

    /// Pixel count, computed without overflow
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// A remote photo together with its available renditions.
///
/// Accepts both `item_id` and the remote API's `id` field; unknown fields
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    #[serde(alias = "id")]
    pub item_id: i64,

    #[serde(default)]
    pub sizes: Vec<Variant>,
}

impl RemoteItem {
    pub fn new(item_id: i64, sizes: Vec<Variant>) -> Self {
        Self { item_id, sizes }
    }

    /// The variant with the largest area. On equal areas the earliest one
    /// wins; `None` when there are no variants.
    pub fn best_variant(&self) -> Option<&Variant> {
        self.sizes.iter().fold(None, |best: Option<&Variant>, candidate| match best {
            Some(current) if current.area() >= candidate.area() => Some(current),
            _ => Some(candidate),
        })
    }
}

/// An owner returned by a people search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerProfile {
    pub id: i64,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,
}

/// A photo that has just been written to disk and should be recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoto {
    pub user_id: i64,
    pub photo_id: i64,
    pub url: String,
    pub file_path: String,

    /// Optional face embedding; stored as-is, never read by the pipeline
    pub embedding: Option<Vec<u8>>,
}

impl NewPhoto {
    pub fn new(
        user_id: i64,
        photo_id: i64,
        url: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            photo_id,
            url: url.into(),
            file_path: file_path.into(),
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<u8>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// A recorded photo as stored in the ledger
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LedgerEntry {
    pub id: i64,
    pub user_id: i64,
    pub photo_id: i64,
    pub url: String,
    pub file_path: String,
    pub embedding: Option<Vec<u8>>,
    pub added_at: DateTime<Utc>,
}
