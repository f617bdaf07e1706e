use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{
    create_access_token, create_refresh_token, hash_password, password_meets_policy,
    username_is_valid, validate_refresh_token, verification, verify_password,
};
use crate::error::ApiError;
use crate::extractors::Json;
use crate::mailer;
use crate::models::user::{self, Entity as User, Role};
use crate::response::ApiResponse;
use crate::storage::{self, validate_image};

use super::AppState;

/// Name of the http-only cookie mirroring the stored refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

// ── Request / Response types ──

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyAccountRequest {
    pub verification_code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/verify-account", post(verify_account))
        .route("/auth/login", post(login))
        .route("/auth/token", get(refresh_token))
        .route("/auth/logout", delete(logout))
}

// ── Helpers ──

async fn find_by_email(
    db: &sea_orm::DatabaseConnection,
    email: &str,
) -> Result<Option<user::Model>, ApiError> {
    let found = User::find()
        .filter(user::Column::Email.eq(email))
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    Ok(found)
}

async fn find_by_refresh_token(
    db: &sea_orm::DatabaseConnection,
    token: &str,
) -> Result<Option<user::Model>, ApiError> {
    let found = User::find()
        .filter(user::Column::RefreshToken.eq(token))
        .filter(user::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    Ok(found)
}

fn refresh_cookie(token: String, ttl_secs: i64) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .path("/")
        .max_age(time::Duration::seconds(ttl_secs))
        .build()
}

fn expired_refresh_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .http_only(true)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

// ── Handlers ──

/// Register a new account and email it a verification code.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Registered, verification email queued"),
        (status = 400, description = "Invalid input"),
        (status = 422, description = "Avatar rejected")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<()>, ApiError> {
    let form = storage::collect_form(multipart).await?;

    // Field checks run in order; the first failure answers the request.
    let (fullname, username, email, password, conf_password) = match (
        form.field("fullname"),
        form.field("username"),
        form.field("email"),
        form.field("password"),
        form.field("conf_password"),
    ) {
        (Some(f), Some(u), Some(e), Some(p), Some(c)) => (f, u, e, p, c),
        _ => {
            return Err(ApiError::Validation("all fields are required".to_string()));
        }
    };

    if find_by_email(&state.db, email).await?.is_some() {
        return Err(ApiError::Validation("email already exists".to_string()));
    }

    if !username_is_valid(username) {
        return Err(ApiError::Validation(
            "username must be at least 3 characters, letters and numbers only".to_string(),
        ));
    }

    let username_taken = User::find()
        .filter(user::Column::Username.eq(username))
        .filter(user::Column::DeletedAt.is_null())
        .one(&state.db)
        .await?
        .is_some();
    if username_taken {
        return Err(ApiError::Validation("username already taken".to_string()));
    }

    if !password_meets_policy(password) {
        return Err(ApiError::Validation(
            "password must be at least 8 characters and contain uppercase, lowercase, number and symbol"
                .to_string(),
        ));
    }

    if password != conf_password {
        return Err(ApiError::Validation(
            "password and confirm password do not match".to_string(),
        ));
    }

    // Argon2 runs on the blocking pool
    let password_hash = hash_password(password).await?;

    let avatar_url = match form.file("avatar") {
        Some(file) => {
            validate_image(file, state.config.max_upload_size)?;
            let stored = state
                .storage
                .store("users", &file.filename, &file.content_type, &file.data)
                .await?;
            stored.url
        }
        None => state.config.default_avatar_url(),
    };

    let now = Utc::now().naive_utc();
    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        fullname: Set(fullname.to_string()),
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(Role::Member),
        verified: Set(false),
        avatar_url: Set(avatar_url),
        refresh_token: Set(None),
        deleted_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let user_model = match new_user.insert(&state.db).await {
        Ok(model) => model,
        // Lost a race with a concurrent registration on email or username
        Err(err) if crate::db::is_unique_violation(&err) => {
            return Err(ApiError::Validation(
                "email or username already taken".to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    let issued = verification::issue_code(&state.db, user_model.id, &state.config).await?;

    // Fire-and-forget: a failed send never fails registration
    mailer::send_detached(
        state.mailer.clone(),
        mailer::verification_email(
            &user_model.fullname,
            &user_model.email,
            &issued.code,
            issued.expires_at,
        ),
    );

    tracing::info!(user_id = %user_model.id, username = %user_model.username, "user registered");

    Ok(ApiResponse::message(
        "register successful, check your email to verify your account",
    ))
}

/// Activate an account with an emailed verification code.
#[utoipa::path(
    post,
    path = "/auth/verify-account",
    request_body = VerifyAccountRequest,
    responses(
        (status = 200, description = "Account activated (or already active)"),
        (status = 404, description = "Unknown code"),
        (status = 409, description = "Code expired, a fresh one was sent"),
        (status = 429, description = "Resend limit reached")
    ),
    tag = "auth"
)]
pub async fn verify_account(
    State(state): State<AppState>,
    Json(payload): Json<VerifyAccountRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    let code = payload.verification_code.trim();

    let record = verification::find_by_code(&state.db, code)
        .await?
        .ok_or_else(|| ApiError::NotFound("invalid verification code".to_string()))?;

    let user_model = User::find_by_id(record.user_id)
        .filter(user::Column::DeletedAt.is_null())
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("invalid verification code".to_string()))?;

    if user_model.verified {
        // Idempotent outcome; drop the lingering row
        verification::delete_for_user(&state.db, record.user_id).await?;
        return Ok(ApiResponse::message("account already active"));
    }

    let now = Utc::now().naive_utc();
    if record.is_expired(now) {
        let issued = verification::reissue_code(&state.db, &record, &state.config).await?;
        mailer::send_detached(
            state.mailer.clone(),
            mailer::verification_email(
                &user_model.fullname,
                &user_model.email,
                &issued.code,
                issued.expires_at,
            ),
        );
        return Err(ApiError::Conflict(
            "verification code expired, a new code has been sent to your email".to_string(),
        ));
    }

    let mut active: user::ActiveModel = user_model.into();
    active.verified = Set(true);
    active.updated_at = Set(now);
    let user_model = active.update(&state.db).await?;

    verification::delete_for_user(&state.db, record.user_id).await?;

    tracing::info!(user_id = %user_model.id, "account activated");

    Ok(ApiResponse::message("account activated successfully"))
}

/// Log in and receive a short-lived access token; the refresh token is set
/// as an http-only cookie and persisted on the user record.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<TokenResponse>),
        (status = 400, description = "Wrong password"),
        (status = 403, description = "Account not verified"),
        (status = 404, description = "Email not registered")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<TokenResponse>), ApiError> {
    let user_model = find_by_email(&state.db, payload.email.trim())
        .await?
        .ok_or_else(|| ApiError::NotFound("email not registered".to_string()))?;

    if !user_model.verified {
        return Err(ApiError::Forbidden(
            "account not verified, check your email".to_string(),
        ));
    }

    let password_ok = verify_password(&payload.password, &user_model.password_hash).await?;
    if !password_ok {
        return Err(ApiError::Validation("wrong password".to_string()));
    }

    // Fresh claims snapshot for both tokens
    let access_token = create_access_token(&user_model, &state.config)?;
    let new_refresh_token = create_refresh_token(&user_model, &state.config)?;

    // Single-session semantics: the new refresh token replaces any previous
    let mut active: user::ActiveModel = user_model.clone().into();
    active.refresh_token = Set(Some(new_refresh_token.clone()));
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await?;

    let jar = jar.add(refresh_cookie(
        new_refresh_token,
        state.config.refresh_token_ttl_secs,
    ));

    tracing::info!(user_id = %user_model.id, "user logged in");

    Ok((
        jar,
        ApiResponse::ok(
            "logged in",
            TokenResponse {
                token: access_token,
            },
        ),
    ))
}

/// Exchange the refresh cookie for a new access token.
#[utoipa::path(
    get,
    path = "/auth/token",
    responses(
        (status = 200, description = "New access token", body = ApiResponse<TokenResponse>),
        (status = 401, description = "No refresh token cookie"),
        (status = 403, description = "Invalid refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<ApiResponse<TokenResponse>, ApiError> {
    let cookie = jar
        .get(REFRESH_COOKIE)
        .ok_or_else(|| ApiError::Unauthorized("no refresh token".to_string()))?;
    let token = cookie.value().to_string();

    let user_model = find_by_refresh_token(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::Forbidden("invalid refresh token".to_string()))?;

    // Signature and expiry against the refresh secret
    validate_refresh_token(&token, &state.config)?;

    // Claims are rebuilt from the current record, never recycled
    let access_token = create_access_token(&user_model, &state.config)?;

    Ok(ApiResponse::ok(
        "refresh token success",
        TokenResponse {
            token: access_token,
        },
    ))
}

/// Log out: clear the stored refresh token and expire the cookie.
#[utoipa::path(
    delete,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 204, description = "Nothing to log out")
    ),
    tag = "auth"
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response, ApiError> {
    let Some(cookie) = jar.get(REFRESH_COOKIE) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    let token = cookie.value().to_string();

    let Some(user_model) = find_by_refresh_token(&state.db, &token).await? else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let user_id = user_model.id;
    let mut active: user::ActiveModel = user_model.into();
    active.refresh_token = Set(None);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await?;

    let jar = jar.remove(expired_refresh_cookie());

    tracing::info!(user_id = %user_id, "user logged out");

    Ok((jar, ApiResponse::message("logged out")).into_response())
}
