use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::db::{Article, ArticleRepository, NewArticle};
use crate::error::AppError;
use crate::fetcher::{ArticleSource, FetchedArticle};
use crate::models::{CreateArticle, SourceUrl, UpdateArticle};

pub struct AppState {
    pub repo: Arc<dyn ArticleRepository>,
    pub source: Arc<dyn ArticleSource>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/articles", post(create_article))
        .route(
            "/articles/:id",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Shapes a fetched payload into a storable article. `source_url` is the
/// requested URL, not wherever redirects ended up.
pub fn article_from_fetched(fetched: &FetchedArticle, source_url: &SourceUrl) -> NewArticle {
    NewArticle {
        title: fetched.title_or_default(),
        content: fetched.body_or_default(),
        summary: fetched.summary(),
        source_url: source_url.to_string(),
    }
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateArticle>, JsonRejection>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    let Json(payload) = payload?;

    let fetched = state.source.fetch(payload.source_url.as_url()).await?;
    let article = article_from_fetched(&fetched, &payload.source_url);
    let stored = state.repo.create_article(&article).await?;

    info!("Created article {} from {}", stored.id, stored.source_url);
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Article>, AppError> {
    let article = state
        .repo
        .get_article(&id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(article))
}

pub async fn update_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateArticle>, JsonRejection>,
) -> Result<Json<Article>, AppError> {
    let Json(payload) = payload?;
    if payload.title.is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }

    // Content and summary stay as they were at creation.
    let article = state
        .repo
        .update_title(&id, &payload.title)
        .await?
        .ok_or(AppError::NotFound)?;

    info!("Updated title of article {}", article.id);
    Ok(Json(article))
}

pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let article = state
        .repo
        .get_article(&id)
        .await?
        .ok_or(AppError::NotFound)?;

    // A concurrent delete may win between the lookup and here.
    if !state.repo.delete_article(&article.id).await? {
        return Err(AppError::NotFound);
    }

    info!("Deleted article {}", article.id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health() -> impl IntoResponse {
    Html("OK")
}
