//! Domain models
//!
//! Entity structs and enums shared between the repository, service, and API
//! layers.

pub mod activity;
pub mod article;
pub mod comment;
pub mod rating;
pub mod reaction;
pub mod session;
pub mod slide;
pub mod user;

pub use activity::{excerpt, ActivityFilter, ActivityRecord, ActivityScope};
pub use article::Article;
pub use comment::{
    Comment, CommentKind, CommentParent, CommentSort, CommentWithAuthor, Reply, ReplyWithAuthor,
};
pub use rating::{AggregateSummary, Rating, RatingTarget, RatingWithAuthor};
pub use reaction::{ReactionCounts, ReactionKind};
pub use session::Session;
pub use slide::{Slide, SlideLevel, SlidePage};
pub use user::User;
