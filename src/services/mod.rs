//! Business logic services
//!
//! Services sit between the API handlers and the repositories: they own
//! validation, visibility, and ownership rules and translate failures into
//! `AppError` variants. Repositories stay free of policy.

pub mod activity;
pub mod comment;
pub mod rating;
pub mod reaction;
pub mod user;

pub use activity::ActivityService;
pub use comment::CommentService;
pub use rating::RatingService;
pub use reaction::ReactionService;
pub use user::UserService;

/// Hard ceiling on page size, shared by every listing endpoint
pub const MAX_PAGE_SIZE: i64 = 100;

/// Default page size when the caller does not pass one
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Normalize 1-based page parameters into a (limit, offset) window
pub(crate) fn page_window(page: i64, limit: i64) -> (i64, i64) {
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let page = page.max(1);
    (limit, (page - 1) * limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_clamps() {
        assert_eq!(page_window(1, 20), (20, 0));
        assert_eq!(page_window(3, 10), (10, 20));
        assert_eq!(page_window(0, 0), (1, 0));
        assert_eq!(page_window(2, 500), (MAX_PAGE_SIZE, MAX_PAGE_SIZE));
    }
}
