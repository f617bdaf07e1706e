use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiError;
use crate::extractors::{AdminUser, Json};
use crate::models::genre::{self, Entity as Genre};
use crate::response::ApiResponse;

use super::AppState;

// ── Request types ──

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenreRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/genres", get(list_genres).post(add_genre))
        .route(
            "/genres/{id}",
            get(get_genre).patch(update_genre).delete(delete_genre),
        )
}

// ── Helpers ──

async fn find_genre(
    db: &sea_orm::DatabaseConnection,
    id: i32,
) -> Result<genre::Model, ApiError> {
    Genre::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("genre not found".to_string()))
}

async fn name_taken(
    db: &sea_orm::DatabaseConnection,
    name: &str,
    exclude_id: Option<i32>,
) -> Result<bool, ApiError> {
    let mut query = Genre::find().filter(genre::Column::Name.eq(name));
    if let Some(id) = exclude_id {
        query = query.filter(genre::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

// ── Handlers ──

/// List all genres.
#[utoipa::path(
    get,
    path = "/genres",
    responses(
        (status = 200, description = "List of genres", body = ApiResponse<Vec<genre::Model>>)
    ),
    tag = "genres"
)]
pub async fn list_genres(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<genre::Model>>, ApiError> {
    let genres = Genre::find()
        .order_by_asc(genre::Column::Id)
        .all(&state.db)
        .await?;

    Ok(ApiResponse::ok("success fetching genres", genres))
}

/// Get a single genre by ID.
#[utoipa::path(
    get,
    path = "/genres/{id}",
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Genre found", body = ApiResponse<genre::Model>),
        (status = 404, description = "Genre not found")
    ),
    tag = "genres"
)]
pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<genre::Model>, ApiError> {
    let genre = find_genre(&state.db, id).await?;
    Ok(ApiResponse::ok("genre found", genre))
}

/// Create a genre (admin only).
#[utoipa::path(
    post,
    path = "/genres",
    request_body = GenreRequest,
    responses(
        (status = 201, description = "Genre created", body = ApiResponse<genre::Model>),
        (status = 400, description = "Missing or duplicate name"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    ),
    tag = "genres",
    security(("bearer_auth" = []))
)]
pub async fn add_genre(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Json(payload): Json<GenreRequest>,
) -> Result<ApiResponse<genre::Model>, ApiError> {
    payload.validate()?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }

    if name_taken(&state.db, &name, None).await? {
        return Err(ApiError::Validation("genre already exists".to_string()));
    }

    let now = Utc::now().naive_utc();
    let new_genre = genre::ActiveModel {
        name: Set(name),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let genre_model = match new_genre.insert(&state.db).await {
        Ok(model) => model,
        Err(err) if crate::db::is_unique_violation(&err) => {
            return Err(ApiError::Validation("genre already exists".to_string()));
        }
        Err(err) => return Err(err.into()),
    };

    Ok(ApiResponse::created("genre added", genre_model))
}

/// Rename a genre (admin only).
#[utoipa::path(
    patch,
    path = "/genres/{id}",
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    request_body = GenreRequest,
    responses(
        (status = 200, description = "Genre updated", body = ApiResponse<genre::Model>),
        (status = 400, description = "Missing or duplicate name"),
        (status = 404, description = "Genre not found")
    ),
    tag = "genres",
    security(("bearer_auth" = []))
)]
pub async fn update_genre(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<GenreRequest>,
) -> Result<ApiResponse<genre::Model>, ApiError> {
    payload.validate()?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }

    let genre_model = find_genre(&state.db, id).await?;

    if name_taken(&state.db, &name, Some(genre_model.id)).await? {
        return Err(ApiError::Validation("genre already exists".to_string()));
    }

    let mut active: genre::ActiveModel = genre_model.into();
    active.name = Set(name);
    active.updated_at = Set(Utc::now().naive_utc());
    let genre_model = active.update(&state.db).await?;

    Ok(ApiResponse::ok("genre updated", genre_model))
}

/// Delete a genre (admin only).
#[utoipa::path(
    delete,
    path = "/genres/{id}",
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Genre deleted"),
        (status = 404, description = "Genre not found")
    ),
    tag = "genres",
    security(("bearer_auth" = []))
)]
pub async fn delete_genre(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<()>, ApiError> {
    let genre_model = find_genre(&state.db, id).await?;
    genre_model.delete(&state.db).await?;

    Ok(ApiResponse::message("genre deleted"))
}
