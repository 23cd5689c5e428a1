use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::author::model::AuthorSummary;
use crate::blog::model::BlogCounters;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub content: String,
    pub blog: ObjectId,
    pub author: ObjectId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub content: String,
    pub blog: String,
    pub author: Option<AuthorSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentView {
    pub fn new(comment: Comment, author: Option<AuthorSummary>) -> Self {
        Self {
            id: comment.id.to_hex(),
            content: comment.content,
            blog: comment.blog.to_hex(),
            author,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

/// A comment write together with the parent blog's counters read after it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWrite {
    pub comment: CommentView,
    pub blog: Option<BlogCounters>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub blog_id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateCommentRequest {
    pub content: Option<String>,
}
