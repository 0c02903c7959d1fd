//! Activity feed composer
//!
//! Fetches up to `SOURCE_CAP` rows from each of the four sources, merges
//! them into one sequence, sorts by timestamp descending with a stable
//! sort (ties keep source order: uploads, slide comments, know-how
//! comments, know-how posts), then pages over the merged result. Paging is
//! applied after the merge, never per source.
//!
//! Because each source is capped independently, a page deep enough to
//! exhaust one source can undercount that source's older records. The cap
//! bounds work per request; callers paging past `SOURCE_CAP` records of a
//! single kind see a truncated tail.

use std::sync::Arc;

use crate::db::repositories::{ActivityRepository, CommentInclusion, SlideRepository};
use crate::error::AppError;
use crate::models::{ActivityFilter, ActivityRecord, ActivityScope};
use crate::services::page_window;

/// Per-source fetch bound
pub const SOURCE_CAP: i64 = 50;

/// Activity feed service
pub struct ActivityService {
    activities: Arc<dyn ActivityRepository>,
    slides: Arc<dyn SlideRepository>,
}

impl ActivityService {
    pub fn new(activities: Arc<dyn ActivityRepository>, slides: Arc<dyn SlideRepository>) -> Self {
        Self { activities, slides }
    }

    /// Compose one page of the feed, returning the page and the merged
    /// total
    pub async fn compose_feed(
        &self,
        scope: ActivityScope,
        filter: ActivityFilter,
        viewer: Option<i64>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<ActivityRecord>, i64), AppError> {
        let author = match (scope, filter) {
            (ActivityScope::User(id), _) => Some(id),
            (_, ActivityFilter::Mine) => {
                Some(viewer.ok_or_else(|| {
                    AppError::unauthenticated("Sign in to filter by your own activity")
                })?)
            }
            _ => None,
        };

        let inclusion = match filter {
            ActivityFilter::Comment => CommentInclusion::CommentsOnly,
            ActivityFilter::Reply => CommentInclusion::RepliesOnly,
            ActivityFilter::All | ActivityFilter::Mine => CommentInclusion::All,
        };

        // Comment and reply filters restrict the feed to the two comment
        // sources; uploads and posts only appear under All / Mine.
        let comment_sources_only =
            matches!(filter, ActivityFilter::Comment | ActivityFilter::Reply);

        let mut merged = Vec::new();
        match scope {
            ActivityScope::Slide(slide_id) => {
                if self.slides.get_by_id(slide_id).await?.is_none() {
                    return Err(AppError::not_found("Slide not found"));
                }
                merged.extend(
                    self.activities
                        .recent_slide_comments(author, Some(slide_id), inclusion, SOURCE_CAP)
                        .await?,
                );
            }
            ActivityScope::Global | ActivityScope::User(_) => {
                if !comment_sources_only {
                    merged.extend(self.activities.recent_uploads(author, SOURCE_CAP).await?);
                }
                merged.extend(
                    self.activities
                        .recent_slide_comments(author, None, inclusion, SOURCE_CAP)
                        .await?,
                );
                merged.extend(
                    self.activities
                        .recent_knowhow_comments(author, inclusion, SOURCE_CAP)
                        .await?,
                );
                if !comment_sources_only {
                    merged.extend(self.activities.recent_knowhow_posts(author, SOURCE_CAP).await?);
                }
            }
        }

        // Stable: equal timestamps keep the source concatenation order
        merged.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

        let total = merged.len() as i64;
        let (limit, offset) = page_window(page, limit);
        let page: Vec<ActivityRecord> = merged
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }
}
