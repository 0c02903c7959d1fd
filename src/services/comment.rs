//! Comment thread service
//!
//! Validation and visibility first, then the repository call. Private
//! know-how articles are indistinguishable from missing ones to anyone
//! but their owner.

use std::sync::Arc;

use crate::db::repositories::comment::CommentSearch;
use crate::db::repositories::{ArticleRepository, CommentRepository, SlideRepository};
use crate::error::AppError;
use crate::models::{
    Comment, CommentKind, CommentParent, CommentSort, CommentWithAuthor, Reply, ReplyWithAuthor,
};
use crate::services::page_window;

/// Longest accepted comment or reply body, in characters
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Comment thread service
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    slides: Arc<dyn SlideRepository>,
    articles: Arc<dyn ArticleRepository>,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        slides: Arc<dyn SlideRepository>,
        articles: Arc<dyn ArticleRepository>,
    ) -> Self {
        Self {
            comments,
            slides,
            articles,
        }
    }

    /// Reject absent parents and articles the viewer may not see
    async fn check_parent(&self, parent: CommentParent, viewer: Option<i64>) -> Result<(), AppError> {
        match parent {
            CommentParent::Slide(id) => {
                if self.slides.get_by_id(id).await?.is_none() {
                    return Err(AppError::not_found("Slide not found"));
                }
            }
            CommentParent::Knowhow(id) => {
                let article = self.articles.get_by_id(id).await?;
                if !article.map(|a| a.visible_to(viewer)).unwrap_or(false) {
                    return Err(AppError::not_found("Article not found"));
                }
            }
        }
        Ok(())
    }

    fn check_content(content: &str) -> Result<&str, AppError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("Content must not be empty"));
        }
        if trimmed.chars().count() > MAX_CONTENT_CHARS {
            return Err(AppError::validation("Content is too long"));
        }
        Ok(trimmed)
    }

    /// Create a comment or improvement proposal under a slide or article
    pub async fn create(
        &self,
        parent: CommentParent,
        user_id: i64,
        content: &str,
        kind: CommentKind,
    ) -> Result<Comment, AppError> {
        let content = Self::check_content(content)?;
        self.check_parent(parent, Some(user_id)).await?;
        Ok(self.comments.create(parent, user_id, content, kind).await?)
    }

    /// One page of a parent's thread plus the total comment count
    pub async fn list(
        &self,
        parent: CommentParent,
        viewer: Option<i64>,
        sort: CommentSort,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<CommentWithAuthor>, i64), AppError> {
        self.check_parent(parent, viewer).await?;
        let (limit, offset) = page_window(page, limit);
        Ok(self.comments.list(parent, sort, limit, offset).await?)
    }

    /// Filtered thread page: keyword and/or minimum author rating
    pub async fn search(
        &self,
        parent: CommentParent,
        viewer: Option<i64>,
        filters: CommentSearch,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<CommentWithAuthor>, i64), AppError> {
        self.check_parent(parent, viewer).await?;
        let (limit, offset) = page_window(page, limit);
        Ok(self.comments.search(parent, &filters, limit, offset).await?)
    }

    /// Delete a comment the caller owns; replies cascade away with it
    pub async fn delete(&self, comment_id: i64, user_id: i64) -> Result<(), AppError> {
        let comment = self
            .comments
            .get_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment not found"))?;
        if comment.user_id != user_id {
            return Err(AppError::forbidden("Only the author can delete a comment"));
        }
        self.comments.delete(comment_id).await?;
        Ok(())
    }

    /// Reply to an existing comment
    pub async fn create_reply(
        &self,
        comment_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<Reply, AppError> {
        let content = Self::check_content(content)?;
        let comment = self
            .comments
            .get_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment not found"))?;
        self.check_parent(comment.parent(), Some(user_id)).await?;
        Ok(self.comments.create_reply(comment_id, user_id, content).await?)
    }

    /// All replies under a comment, oldest first
    pub async fn list_replies(
        &self,
        comment_id: i64,
        viewer: Option<i64>,
    ) -> Result<Vec<ReplyWithAuthor>, AppError> {
        let comment = self
            .comments
            .get_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment not found"))?;
        self.check_parent(comment.parent(), viewer).await?;
        Ok(self.comments.list_replies(comment_id).await?)
    }
}
