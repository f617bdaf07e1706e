use utoipa::OpenApi;

use crate::controllers::auth::{LoginRequest, TokenResponse, VerifyAccountRequest};
use crate::controllers::genres::GenreRequest;
use crate::controllers::movies::MovieResponse;
use crate::controllers::users::{AddUserRequest, UpdateUserRequest};
use crate::models::genre;
use crate::models::movie;
use crate::models::user::{Role, UserResponse};

/// Auto-generated OpenAPI documentation for Bijou.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bijou API",
        version = "0.4.2",
        description = "Movie catalog backend with email-verified accounts."
    ),
    paths(
        crate::controllers::auth::register,
        crate::controllers::auth::verify_account,
        crate::controllers::auth::login,
        crate::controllers::auth::refresh_token,
        crate::controllers::auth::logout,
        crate::controllers::genres::list_genres,
        crate::controllers::genres::get_genre,
        crate::controllers::genres::add_genre,
        crate::controllers::genres::update_genre,
        crate::controllers::genres::delete_genre,
        crate::controllers::movies::list_movies,
        crate::controllers::movies::get_movie,
        crate::controllers::movies::add_movie,
        crate::controllers::movies::update_movie,
        crate::controllers::movies::delete_movie,
        crate::controllers::users::list_users,
        crate::controllers::users::get_user,
        crate::controllers::users::add_user,
        crate::controllers::users::update_user,
        crate::controllers::users::delete_user,
    ),
    components(
        schemas(
            VerifyAccountRequest,
            LoginRequest,
            TokenResponse,
            GenreRequest,
            AddUserRequest,
            UpdateUserRequest,
            MovieResponse,
            UserResponse,
            Role,
            genre::Model,
            movie::Model,
        )
    ),
    tags(
        (name = "auth", description = "Registration, verification and session endpoints"),
        (name = "genres", description = "Genre catalog"),
        (name = "movies", description = "Movie catalog"),
        (name = "users", description = "User administration")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add JWT Bearer security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
