//! Kyozai - discussion and rating backend for a teaching-material sharing
//! platform

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kyozai::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxActivityRepository, SqlxArticleRepository, SqlxCommentRepository,
            SqlxRatingRepository, SqlxReactionRepository, SqlxSessionRepository,
            SqlxSlideRepository, SqlxUserRepository,
        },
    },
    error::set_expose_store_detail,
    services::{ActivityService, CommentService, RatingService, ReactionService, UserService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kyozai=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Kyozai backend...");

    // Load configuration
    let config = Config::load(Path::new("config.yml"))?;
    set_expose_store_detail(config.environment.is_development());
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let slide_repo = SqlxSlideRepository::boxed(pool.clone());
    let article_repo = SqlxArticleRepository::boxed(pool.clone());
    let comment_repo = SqlxCommentRepository::boxed(pool.clone());
    let rating_repo = SqlxRatingRepository::boxed(pool.clone());
    let reaction_repo = SqlxReactionRepository::boxed(pool.clone());
    let activity_repo = SqlxActivityRepository::boxed(pool.clone());

    // Initialize services
    let user_service = Arc::new(UserService::new(user_repo, session_repo));
    let comment_service = Arc::new(CommentService::new(
        comment_repo,
        slide_repo.clone(),
        article_repo.clone(),
    ));
    let rating_service = Arc::new(RatingService::new(rating_repo, slide_repo.clone()));
    let activity_service = Arc::new(ActivityService::new(activity_repo, slide_repo));
    let reaction_service = Arc::new(ReactionService::new(reaction_repo, article_repo));

    // Sweep stale sessions left over from the previous run
    let removed = user_service.purge_expired_sessions().await?;
    if removed > 0 {
        tracing::info!("Removed {} expired sessions", removed);
    }

    // Build application state
    let state = AppState {
        user_service,
        comment_service,
        rating_service,
        activity_service,
        reaction_service,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
