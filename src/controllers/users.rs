use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{hash_password, password_meets_policy, username_is_valid};
use crate::error::ApiError;
use crate::extractors::{AdminUser, Json};
use crate::models::user::{self, Entity as User, Role, UserResponse};
use crate::response::ApiResponse;

use super::AppState;

// ── Request types ──

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddUserRequest {
    #[validate(length(min = 1, message = "fullname is required"))]
    pub fullname: String,
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    #[validate(length(min = 1, message = "confirm password is required"))]
    pub conf_password: String,
    pub role: Option<Role>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub fullname: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub conf_password: Option<String>,
    pub role: Option<Role>,
    pub avatar_url: Option<String>,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(add_user))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

// ── Helpers ──

async fn find_user(
    db: &sea_orm::DatabaseConnection,
    id: Uuid,
) -> Result<user::Model, ApiError> {
    User::find_by_id(id)
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))
}

async fn email_taken(
    db: &sea_orm::DatabaseConnection,
    email: &str,
    exclude_id: Option<Uuid>,
) -> Result<bool, ApiError> {
    let mut query = User::find()
        .filter(user::Column::Email.eq(email))
        .filter(user::Column::DeletedAt.is_null());
    if let Some(id) = exclude_id {
        query = query.filter(user::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

async fn username_taken(
    db: &sea_orm::DatabaseConnection,
    username: &str,
    exclude_id: Option<Uuid>,
) -> Result<bool, ApiError> {
    let mut query = User::find()
        .filter(user::Column::Username.eq(username))
        .filter(user::Column::DeletedAt.is_null());
    if let Some(id) = exclude_id {
        query = query.filter(user::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

// ── Handlers ──

/// List all users (admin only).
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "List of users", body = ApiResponse<Vec<UserResponse>>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
) -> Result<ApiResponse<Vec<UserResponse>>, ApiError> {
    let users = User::find()
        .filter(user::Column::DeletedAt.is_null())
        .order_by_asc(user::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let response: Vec<UserResponse> = users.into_iter().map(|u| u.into()).collect();
    Ok(ApiResponse::ok("success fetching user", response))
}

/// Get a single user by UUID (admin only).
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User UUID")
    ),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<UserResponse>, ApiError> {
    let user_model = find_user(&state.db, id).await?;
    Ok(ApiResponse::ok("user found", UserResponse::from(user_model)))
}

/// Create a user directly (admin only). Admin-created accounts skip the
/// email verification flow.
#[utoipa::path(
    post,
    path = "/users",
    request_body = AddUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not an admin")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn add_user(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Json(payload): Json<AddUserRequest>,
) -> Result<ApiResponse<UserResponse>, ApiError> {
    payload.validate()?;

    let email = payload.email.trim();
    let username = payload.username.trim();

    if email_taken(&state.db, email, None).await? {
        return Err(ApiError::Validation("email already exists".to_string()));
    }

    if !username_is_valid(username) {
        return Err(ApiError::Validation(
            "username must be at least 3 characters, letters and numbers only".to_string(),
        ));
    }

    if username_taken(&state.db, username, None).await? {
        return Err(ApiError::Validation("username already taken".to_string()));
    }

    if !password_meets_policy(&payload.password) {
        return Err(ApiError::Validation(
            "password must be at least 8 characters and contain uppercase, lowercase, number and symbol"
                .to_string(),
        ));
    }

    if payload.password != payload.conf_password {
        return Err(ApiError::Validation(
            "password and confirm password do not match".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password).await?;

    let now = Utc::now().naive_utc();
    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        fullname: Set(payload.fullname.trim().to_string()),
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(payload.role.unwrap_or(Role::Member)),
        verified: Set(true),
        avatar_url: Set(payload
            .avatar_url
            .unwrap_or_else(|| state.config.default_avatar_url())),
        refresh_token: Set(None),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let user_model = match new_user.insert(&state.db).await {
        Ok(model) => model,
        Err(err) if crate::db::is_unique_violation(&err) => {
            return Err(ApiError::Validation(
                "email or username already taken".to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(user_id = %user_model.id, "user created by admin");

    Ok(ApiResponse::created(
        "user created",
        UserResponse::from(user_model),
    ))
}

/// Update a user (admin only). Empty or absent password keeps the current
/// one; a new password must match its confirmation.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User UUID")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<ApiResponse<UserResponse>, ApiError> {
    let user_model = find_user(&state.db, id).await?;

    if let Some(email) = payload.email.as_deref().map(str::trim) {
        if email_taken(&state.db, email, Some(user_model.id)).await? {
            return Err(ApiError::Validation("email already exists".to_string()));
        }
    }

    if let Some(username) = payload.username.as_deref().map(str::trim) {
        if !username_is_valid(username) {
            return Err(ApiError::Validation(
                "username must be at least 3 characters, letters and numbers only".to_string(),
            ));
        }
        if username_taken(&state.db, username, Some(user_model.id)).await? {
            return Err(ApiError::Validation("username already taken".to_string()));
        }
    }

    // Empty password means keep the current hash
    let new_hash = match payload.password.as_deref() {
        None | Some("") => None,
        Some(password) => {
            if payload.conf_password.as_deref() != Some(password) {
                return Err(ApiError::Validation(
                    "password and confirm password do not match".to_string(),
                ));
            }
            Some(hash_password(password).await?)
        }
    };

    let mut active: user::ActiveModel = user_model.into();
    if let Some(fullname) = payload.fullname {
        active.fullname = Set(fullname.trim().to_string());
    }
    if let Some(username) = payload.username {
        active.username = Set(username.trim().to_string());
    }
    if let Some(email) = payload.email {
        active.email = Set(email.trim().to_string());
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    if let Some(avatar_url) = payload.avatar_url {
        active.avatar_url = Set(avatar_url);
    }
    if let Some(hash) = new_hash {
        active.password_hash = Set(hash);
    }
    active.updated_at = Set(Utc::now().naive_utc());

    let user_model = match active.update(&state.db).await {
        Ok(model) => model,
        Err(err) if crate::db::is_unique_violation(&err) => {
            return Err(ApiError::Validation(
                "email or username already taken".to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    Ok(ApiResponse::ok(
        "user updated",
        UserResponse::from(user_model),
    ))
}

/// Soft-delete a user (admin only). Any live session is cut off with it.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User UUID")
    ),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found")
    ),
    tag = "users",
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<()>, ApiError> {
    let user_model = find_user(&state.db, id).await?;

    let user_id = user_model.id;
    let mut active: user::ActiveModel = user_model.into();
    active.deleted_at = Set(Some(Utc::now().naive_utc()));
    active.refresh_token = Set(None);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await?;

    tracing::info!(user_id = %user_id, "user deleted");

    Ok(ApiResponse::message("user deleted"))
}
