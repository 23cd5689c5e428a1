//! Keeps `Blog.commentCount` and `Blog.likeCount` equal to the number of
//! comments and likes that reference the blog.
//!
//! Every trigger recounts the child collection and overwrites the field, so a
//! lost or raced update is repaired by the next trigger on the same blog.
//! Failures are logged and swallowed: the write that triggered the recount has
//! already succeeded and is not rolled back.

use std::sync::Arc;

use log::{debug, error};
use mongodb::bson::oid::ObjectId;

use crate::blog::repository::BlogRepository;
use crate::comment::model::Comment;
use crate::comment::repository::CommentRepository;
use crate::like::model::Like;
use crate::like::repository::LikeRepository;
use crate::utils::error::CustomError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Comments,
    Likes,
}

impl Counter {
    /// Field on the stored blog document.
    pub fn field(&self) -> &'static str {
        match self {
            Counter::Comments => "commentCount",
            Counter::Likes => "likeCount",
        }
    }
}

#[derive(Clone)]
pub struct CounterSynchronizer {
    blogs: Arc<dyn BlogRepository>,
    comments: Arc<dyn CommentRepository>,
    likes: Arc<dyn LikeRepository>,
}

impl CounterSynchronizer {
    pub fn new(
        blogs: Arc<dyn BlogRepository>,
        comments: Arc<dyn CommentRepository>,
        likes: Arc<dyn LikeRepository>,
    ) -> Self {
        Self {
            blogs,
            comments,
            likes,
        }
    }

    pub async fn on_comment_created(&self, comment: &Comment) -> Option<i64> {
        self.sync(Counter::Comments, &comment.blog).await
    }

    pub async fn on_comment_deleted(&self, comment: &Comment) -> Option<i64> {
        self.sync(Counter::Comments, &comment.blog).await
    }

    pub async fn on_like_created(&self, like: &Like) -> Option<i64> {
        self.sync(Counter::Likes, &like.blog).await
    }

    pub async fn on_like_deleted(&self, like: &Like) -> Option<i64> {
        self.sync(Counter::Likes, &like.blog).await
    }

    /// Recount and store `counter` for `blog`. Returns the written value, or
    /// `None` when the recount failed.
    pub async fn sync(&self, counter: Counter, blog: &ObjectId) -> Option<i64> {
        match self.recount(counter, blog).await {
            Ok(count) => {
                debug!("blog {} {} = {}", blog, counter.field(), count);
                Some(count)
            }
            Err(e) => {
                error!("Error updating {} for blog {}: {}", counter.field(), blog, e);
                None
            }
        }
    }

    async fn recount(&self, counter: Counter, blog: &ObjectId) -> Result<i64, CustomError> {
        let count = match counter {
            Counter::Comments => self.comments.count_for_blog(blog).await?,
            Counter::Likes => self.likes.count_for_blog(blog).await?,
        };
        let count = i64::try_from(count).unwrap_or(i64::MAX);

        self.blogs.set_counter(blog, counter, count).await?;
        Ok(count)
    }
}
