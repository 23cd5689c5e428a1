use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::author::model::AuthorSummary;
use crate::blog::model::BlogCounters;

/// At most one per (blog, author); the unique index enforces it.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub blog: ObjectId,
    pub author: ObjectId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LikeView {
    pub id: String,
    pub blog: String,
    pub author: Option<AuthorSummary>,
    pub created_at: DateTime<Utc>,
}

impl LikeView {
    pub fn new(like: Like, author: Option<AuthorSummary>) -> Self {
        Self {
            id: like.id.to_hex(),
            blog: like.blog.to_hex(),
            author,
            created_at: like.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    pub is_liked: bool,
    pub blog: Option<BlogCounters>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    pub blog_id: Option<String>,
}
