use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::author::model::AuthorSummary;

pub const MIN_IMAGES: usize = 2;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlogState {
    #[default]
    Draft,
    Published,
}

/// Stored blog document. `like_count` and `comment_count` are derived from the
/// likes and comments collections and are only written by the counter
/// synchronizer.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub body: String,
    pub author: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ObjectId>,
    #[serde(default)]
    pub state: BlogState,
    pub images: Vec<String>,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Blog as served to clients and stored in the read cache, author resolved.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlogView {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author: Option<AuthorSummary>,
    pub category: Option<String>,
    pub state: BlogState,
    pub images: Vec<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogView {
    pub fn new(blog: Blog, author: Option<AuthorSummary>) -> Self {
        Self {
            id: blog.id.to_hex(),
            title: blog.title,
            body: blog.body,
            author,
            category: blog.category.map(|c| c.to_hex()),
            state: blog.state,
            images: blog.images,
            like_count: blog.like_count,
            comment_count: blog.comment_count,
            created_at: blog.created_at,
            updated_at: blog.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BlogCounters {
    pub like_count: i64,
    pub comment_count: i64,
}

impl From<&Blog> for BlogCounters {
    fn from(blog: &Blog) -> Self {
        Self {
            like_count: blog.like_count,
            comment_count: blog.comment_count,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub state: Option<BlogState>,
    pub images: Option<Vec<String>>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub body: Option<String>,
    pub state: Option<BlogState>,
    pub images: Option<Vec<String>>,
    pub category: Option<String>,
}

/// Validated field changes for an update; `None` leaves a field as it is.
#[derive(Debug, Default, Clone)]
pub struct BlogChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub state: Option<BlogState>,
    pub images: Option<Vec<String>>,
    pub category: Option<ObjectId>,
}

impl BlogChanges {
    pub fn apply(self, blog: &mut Blog, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            blog.title = title;
        }
        if let Some(body) = self.body {
            blog.body = body;
        }
        if let Some(state) = self.state {
            blog.state = state;
        }
        if let Some(images) = self.images {
            blog.images = images;
        }
        if let Some(category) = self.category {
            blog.category = Some(category);
        }
        blog.updated_at = now;
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}
