use axum::{
    extract::{Multipart, Path, State},
    routing::get,
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::models::genre::{self, Entity as Genre};
use crate::models::movie::{self, Entity as Movie};
use crate::response::ApiResponse;
use crate::storage::{self, validate_image, FormData};

use super::AppState;

// ── Response types ──

/// Movie with its genre joined in.
#[derive(Debug, Serialize, ToSchema)]
pub struct MovieResponse {
    #[serde(flatten)]
    pub movie: movie::Model,
    pub genre: Option<genre::Model>,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies).post(add_movie))
        .route(
            "/movies/{id}",
            get(get_movie).patch(update_movie).delete(delete_movie),
        )
}

// ── Helpers ──

async fn find_movie(
    db: &sea_orm::DatabaseConnection,
    id: i32,
) -> Result<movie::Model, ApiError> {
    Movie::find_by_id(id)
        .filter(movie::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("movie not found".to_string()))
}

async fn title_taken(
    db: &sea_orm::DatabaseConnection,
    title: &str,
    exclude_id: Option<i32>,
) -> Result<bool, ApiError> {
    let mut query = Movie::find()
        .filter(movie::Column::Title.eq(title))
        .filter(movie::Column::DeletedAt.is_null());
    if let Some(id) = exclude_id {
        query = query.filter(movie::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

/// The target genre must exist before a movie can point at it.
async fn require_genre(
    db: &sea_orm::DatabaseConnection,
    genre_id: i32,
) -> Result<genre::Model, ApiError> {
    Genre::find_by_id(genre_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::Validation("genre not found".to_string()))
}

fn parse_field<T: FromStr>(raw: &str, field: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::Validation(format!("invalid {field}")))
}

/// Store a new poster, replacing `current_url`. The previous file is removed
/// best-effort; the shared default poster is never touched.
async fn replace_poster(
    state: &AppState,
    form: &FormData,
    current_url: Option<&str>,
) -> Result<Option<String>, ApiError> {
    let Some(file) = form.file("poster") else {
        return Ok(None);
    };

    validate_image(file, state.config.max_upload_size)?;
    let stored = state
        .storage
        .store("posters", &file.filename, &file.content_type, &file.data)
        .await?;

    if let Some(old_name) = current_url.and_then(storage::stored_name_from_url) {
        if let Err(err) = state.storage.delete("posters", old_name).await {
            tracing::warn!(stored_name = %old_name, error = %err, "failed to delete old poster");
        }
    }

    Ok(Some(stored.url))
}

// ── Handlers ──

/// List all movies with their genres.
#[utoipa::path(
    get,
    path = "/movies",
    responses(
        (status = 200, description = "List of movies", body = ApiResponse<Vec<MovieResponse>>)
    ),
    tag = "movies"
)]
pub async fn list_movies(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<MovieResponse>>, ApiError> {
    let movies = Movie::find()
        .filter(movie::Column::DeletedAt.is_null())
        .order_by_asc(movie::Column::Title)
        .find_also_related(Genre)
        .all(&state.db)
        .await?;

    let response: Vec<MovieResponse> = movies
        .into_iter()
        .map(|(movie, genre)| MovieResponse { movie, genre })
        .collect();

    Ok(ApiResponse::ok("success fetching movies", response))
}

/// Get a single movie by ID.
#[utoipa::path(
    get,
    path = "/movies/{id}",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Movie found", body = ApiResponse<MovieResponse>),
        (status = 404, description = "Movie not found")
    ),
    tag = "movies"
)]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<ApiResponse<MovieResponse>, ApiError> {
    let (movie, genre) = Movie::find_by_id(id)
        .filter(movie::Column::DeletedAt.is_null())
        .find_also_related(Genre)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("movie not found".to_string()))?;

    Ok(ApiResponse::ok("movie found", MovieResponse { movie, genre }))
}

/// Create a movie (admin only).
#[utoipa::path(
    post,
    path = "/movies",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Movie created", body = ApiResponse<MovieResponse>),
        (status = 400, description = "Invalid input"),
        (status = 422, description = "Poster rejected")
    ),
    tag = "movies",
    security(("bearer_auth" = []))
)]
pub async fn add_movie(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    multipart: Multipart,
) -> Result<ApiResponse<MovieResponse>, ApiError> {
    let form = storage::collect_form(multipart).await?;

    let (
        title,
        overview,
        rating,
        age_rating,
        genre_id,
        release_date,
        runtime,
        casters,
        director,
        writer,
        is_premium,
        trailer_url,
        video_url,
    ) = match (
        form.field("title"),
        form.field("overview"),
        form.field("rating"),
        form.field("age_rating"),
        form.field("genre_id"),
        form.field("release_date"),
        form.field("runtime"),
        form.field("casters"),
        form.field("director"),
        form.field("writer"),
        form.field("is_premium"),
        form.field("trailer_url"),
        form.field("video_url"),
    ) {
        (
            Some(a),
            Some(b),
            Some(c),
            Some(d),
            Some(e),
            Some(f),
            Some(g),
            Some(h),
            Some(i),
            Some(j),
            Some(k),
            Some(l),
            Some(m),
        ) => (a, b, c, d, e, f, g, h, i, j, k, l, m),
        _ => {
            return Err(ApiError::Validation("all fields are required".to_string()));
        }
    };

    let rating: f32 = parse_field(rating, "rating")?;
    let genre_id: i32 = parse_field(genre_id, "genre_id")?;
    let release_date: chrono::NaiveDate = parse_field(release_date, "release_date")?;
    let runtime: i32 = parse_field(runtime, "runtime")?;
    let is_premium: bool = parse_field(is_premium, "is_premium")?;

    if title_taken(&state.db, title, None).await? {
        return Err(ApiError::Validation("movie already exists".to_string()));
    }

    let genre_model = require_genre(&state.db, genre_id).await?;

    let poster_url = match replace_poster(&state, &form, None).await? {
        Some(url) => url,
        None => state.config.default_poster_url(),
    };

    let now = Utc::now().naive_utc();
    let new_movie = movie::ActiveModel {
        title: Set(title.to_string()),
        overview: Set(overview.to_string()),
        rating: Set(rating),
        age_rating: Set(age_rating.to_string()),
        genre_id: Set(genre_id),
        release_date: Set(release_date),
        runtime: Set(runtime),
        casters: Set(casters.to_string()),
        director: Set(director.to_string()),
        writer: Set(writer.to_string()),
        is_premium: Set(is_premium),
        poster_url: Set(poster_url),
        trailer_url: Set(trailer_url.to_string()),
        video_url: Set(video_url.to_string()),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let movie_model = new_movie.insert(&state.db).await?;

    tracing::info!(movie_id = movie_model.id, title = %movie_model.title, "movie added");

    Ok(ApiResponse::created(
        "movie added",
        MovieResponse {
            movie: movie_model,
            genre: Some(genre_model),
        },
    ))
}

/// Update a movie (admin only). Only provided fields change.
#[utoipa::path(
    patch,
    path = "/movies/{id}",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Movie updated", body = ApiResponse<MovieResponse>),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Movie not found"),
        (status = 422, description = "Poster rejected")
    ),
    tag = "movies",
    security(("bearer_auth" = []))
)]
pub async fn update_movie(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<ApiResponse<MovieResponse>, ApiError> {
    let movie_model = find_movie(&state.db, id).await?;
    let form = storage::collect_form(multipart).await?;

    if let Some(title) = form.field("title") {
        if title_taken(&state.db, title, Some(movie_model.id)).await? {
            return Err(ApiError::Validation("movie already exists".to_string()));
        }
    }

    let mut genre_model = None;
    if let Some(raw) = form.field("genre_id") {
        let genre_id: i32 = parse_field(raw, "genre_id")?;
        genre_model = Some(require_genre(&state.db, genre_id).await?);
    }

    let current_poster = movie_model.poster_url.clone();
    let mut active: movie::ActiveModel = movie_model.into();
    if let Some(title) = form.field("title") {
        active.title = Set(title.to_string());
    }
    if let Some(overview) = form.field("overview") {
        active.overview = Set(overview.to_string());
    }
    if let Some(raw) = form.field("rating") {
        active.rating = Set(parse_field(raw, "rating")?);
    }
    if let Some(age_rating) = form.field("age_rating") {
        active.age_rating = Set(age_rating.to_string());
    }
    if let Some(genre) = &genre_model {
        active.genre_id = Set(genre.id);
    }
    if let Some(raw) = form.field("release_date") {
        active.release_date = Set(parse_field(raw, "release_date")?);
    }
    if let Some(raw) = form.field("runtime") {
        active.runtime = Set(parse_field(raw, "runtime")?);
    }
    if let Some(casters) = form.field("casters") {
        active.casters = Set(casters.to_string());
    }
    if let Some(director) = form.field("director") {
        active.director = Set(director.to_string());
    }
    if let Some(writer) = form.field("writer") {
        active.writer = Set(writer.to_string());
    }
    if let Some(raw) = form.field("is_premium") {
        active.is_premium = Set(parse_field(raw, "is_premium")?);
    }
    if let Some(trailer_url) = form.field("trailer_url") {
        active.trailer_url = Set(trailer_url.to_string());
    }
    if let Some(video_url) = form.field("video_url") {
        active.video_url = Set(video_url.to_string());
    }

    // Poster last, once every scalar field has parsed
    if let Some(url) = replace_poster(&state, &form, Some(&current_poster)).await? {
        active.poster_url = Set(url);
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let movie_model = active.update(&state.db).await?;

    let genre_model = match genre_model {
        Some(genre) => Some(genre),
        None => Genre::find_by_id(movie_model.genre_id).one(&state.db).await?,
    };

    Ok(ApiResponse::ok(
        "movie updated",
        MovieResponse {
            movie: movie_model,
            genre: genre_model,
        },
    ))
}

/// Soft-delete a movie (admin only). The stored poster file is removed
/// best-effort.
#[utoipa::path(
    delete,
    path = "/movies/{id}",
    params(
        ("id" = i32, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Movie deleted"),
        (status = 404, description = "Movie not found")
    ),
    tag = "movies",
    security(("bearer_auth" = []))
)]
pub async fn delete_movie(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<i32>,
) -> Result<ApiResponse<()>, ApiError> {
    let movie_model = find_movie(&state.db, id).await?;

    if let Some(name) = storage::stored_name_from_url(&movie_model.poster_url) {
        let name = name.to_string();
        if let Err(err) = state.storage.delete("posters", &name).await {
            tracing::warn!(stored_name = %name, error = %err, "failed to delete poster");
        }
    }

    let movie_id = movie_model.id;
    let mut active: movie::ActiveModel = movie_model.into();
    active.deleted_at = Set(Some(Utc::now().naive_utc()));
    active.update(&state.db).await?;

    tracing::info!(movie_id, "movie deleted");

    Ok(ApiResponse::message("movie deleted"))
}
