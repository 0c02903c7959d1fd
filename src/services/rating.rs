//! Rating service
//!
//! Resolves targets, enforces score ranges, and delegates the
//! upsert-and-recompute to the repository's transaction.

use std::sync::Arc;

use crate::db::repositories::{RatingRepository, SlideRepository};
use crate::error::AppError;
use crate::models::{AggregateSummary, Rating, RatingTarget, RatingWithAuthor};
use crate::services::page_window;

/// Rating service
pub struct RatingService {
    ratings: Arc<dyn RatingRepository>,
    slides: Arc<dyn SlideRepository>,
}

impl RatingService {
    pub fn new(ratings: Arc<dyn RatingRepository>, slides: Arc<dyn SlideRepository>) -> Self {
        Self { ratings, slides }
    }

    fn check_score(target: RatingTarget, score: i64) -> Result<(), AppError> {
        let (min, max) = target.score_range();
        if score < min || score > max {
            return Err(AppError::validation(format!(
                "Score must be between {} and {}",
                min, max
            )));
        }
        Ok(())
    }

    fn clean_feedback(feedback: Option<&str>) -> Option<&str> {
        feedback.map(str::trim).filter(|f| !f.is_empty())
    }

    async fn check_slide(&self, slide_id: i64) -> Result<(), AppError> {
        if self.slides.get_by_id(slide_id).await?.is_none() {
            return Err(AppError::not_found("Slide not found"));
        }
        Ok(())
    }

    /// Resolve (slide, page index) to the page's rating target
    async fn page_target(&self, slide_id: i64, page_index: i64) -> Result<RatingTarget, AppError> {
        self.check_slide(slide_id).await?;
        let page = self
            .slides
            .get_page(slide_id, page_index)
            .await?
            .ok_or_else(|| AppError::not_found("Slide page not found"))?;
        Ok(RatingTarget::Page(page.id))
    }

    /// Submit or overwrite a difficulty rating for a whole slide (0-100)
    pub async fn rate_slide(
        &self,
        user_id: i64,
        slide_id: i64,
        score: i64,
        feedback: Option<&str>,
    ) -> Result<AggregateSummary, AppError> {
        let target = RatingTarget::Slide(slide_id);
        Self::check_score(target, score)?;
        self.check_slide(slide_id).await?;
        Ok(self
            .ratings
            .submit(user_id, target, score, Self::clean_feedback(feedback))
            .await?)
    }

    /// Submit or overwrite a star rating for one page (0-5)
    pub async fn rate_page(
        &self,
        user_id: i64,
        slide_id: i64,
        page_index: i64,
        score: i64,
        feedback: Option<&str>,
    ) -> Result<AggregateSummary, AppError> {
        Self::check_score(RatingTarget::Page(0), score)?;
        let target = self.page_target(slide_id, page_index).await?;
        Ok(self
            .ratings
            .submit(user_id, target, score, Self::clean_feedback(feedback))
            .await?)
    }

    /// One page of a slide's ratings with the total count
    pub async fn slide_ratings(
        &self,
        slide_id: i64,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<RatingWithAuthor>, i64), AppError> {
        self.check_slide(slide_id).await?;
        let (limit, offset) = page_window(page, limit);
        Ok(self
            .ratings
            .list(RatingTarget::Slide(slide_id), limit, offset)
            .await?)
    }

    /// One page of a slide page's star ratings with the total count
    pub async fn page_ratings(
        &self,
        slide_id: i64,
        page_index: i64,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<RatingWithAuthor>, i64), AppError> {
        let target = self.page_target(slide_id, page_index).await?;
        let (limit, offset) = page_window(page, limit);
        Ok(self.ratings.list(target, limit, offset).await?)
    }

    /// The caller's own rating of a slide, if any
    pub async fn own_slide_rating(
        &self,
        user_id: i64,
        slide_id: i64,
    ) -> Result<Option<Rating>, AppError> {
        self.check_slide(slide_id).await?;
        Ok(self
            .ratings
            .get_user_rating(user_id, RatingTarget::Slide(slide_id))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::test_support::{migrated_pool, seed_page, seed_slide, seed_user};
    use crate::db::repositories::{SqlxRatingRepository, SqlxSlideRepository};

    async fn service() -> RatingService {
        let pool = migrated_pool().await;
        seed_user(&pool, 1, "okada").await;
        seed_user(&pool, 2, "nishida").await;
        seed_user(&pool, 3, "ueda").await;
        seed_slide(&pool, 10, 1, "Listening drills").await;
        seed_page(&pool, 100, 10, 0).await;
        RatingService::new(
            SqlxRatingRepository::boxed(pool.clone()),
            SqlxSlideRepository::boxed(pool),
        )
    }

    #[tokio::test]
    async fn test_three_ratings_average_to_mean() {
        let service = service().await;
        service.rate_slide(1, 10, 80, None).await.unwrap();
        service.rate_slide(2, 10, 90, None).await.unwrap();
        let summary = service.rate_slide(3, 10, 100, None).await.unwrap();
        assert_eq!(summary.average, 90.0);
        assert_eq!(summary.count, 3);
    }

    #[tokio::test]
    async fn test_out_of_range_scores_rejected() {
        let service = service().await;
        let err = service.rate_slide(1, 10, 101, None).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

        let err = service.rate_page(1, 10, 0, 6, None).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);

        let err = service.rate_slide(1, 10, -1, None).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_targets_are_not_found() {
        let service = service().await;
        let err = service.rate_slide(1, 999, 50, None).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);

        let err = service.rate_page(1, 10, 42, 3, None).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_blank_feedback_stored_as_none() {
        let service = service().await;
        service.rate_slide(1, 10, 75, Some("  ")).await.unwrap();
        let own = service.own_slide_rating(1, 10).await.unwrap().unwrap();
        assert_eq!(own.feedback, None);
    }

    #[tokio::test]
    async fn test_page_rating_resolved_by_index() {
        let service = service().await;
        let summary = service.rate_page(1, 10, 0, 5, None).await.unwrap();
        assert_eq!(summary.average, 5.0);
        assert_eq!(summary.count, 1);
    }
}
