//! Reaction service

use std::sync::Arc;

use crate::db::repositories::{ArticleRepository, ReactionRepository};
use crate::error::AppError;
use crate::models::{ReactionCounts, ReactionKind};

/// Per-article reaction tally plus the caller's own reaction
#[derive(Debug, Clone)]
pub struct ReactionSummary {
    pub counts: ReactionCounts,
    pub own: Option<ReactionKind>,
}

/// Reaction service
pub struct ReactionService {
    reactions: Arc<dyn ReactionRepository>,
    articles: Arc<dyn ArticleRepository>,
}

impl ReactionService {
    pub fn new(reactions: Arc<dyn ReactionRepository>, articles: Arc<dyn ArticleRepository>) -> Self {
        Self { reactions, articles }
    }

    async fn check_article(&self, article_id: i64, viewer: Option<i64>) -> Result<(), AppError> {
        let article = self.articles.get_by_id(article_id).await?;
        if !article.map(|a| a.visible_to(viewer)).unwrap_or(false) {
            return Err(AppError::not_found("Article not found"));
        }
        Ok(())
    }

    /// Set or replace the caller's reaction, returning the fresh tally
    pub async fn set(
        &self,
        user_id: i64,
        article_id: i64,
        kind: ReactionKind,
    ) -> Result<ReactionSummary, AppError> {
        self.check_article(article_id, Some(user_id)).await?;
        self.reactions.set(user_id, article_id, kind).await?;
        Ok(ReactionSummary {
            counts: self.reactions.counts(article_id).await?,
            own: Some(kind),
        })
    }

    /// Tally for an article; anonymous callers get `own: None`
    pub async fn summary(
        &self,
        article_id: i64,
        viewer: Option<i64>,
    ) -> Result<ReactionSummary, AppError> {
        self.check_article(article_id, viewer).await?;
        let counts = self.reactions.counts(article_id).await?;
        let own = match viewer {
            Some(user_id) => self.reactions.get_user_reaction(user_id, article_id).await?,
            None => None,
        };
        Ok(ReactionSummary { counts, own })
    }
}
