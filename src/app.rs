use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::config::Config;
use crate::controllers::{self, AppState};
use crate::mailer::{self, Mailer};
use crate::migrations::Migrator;
use crate::openapi::ApiDoc;
use crate::storage::{LocalStorage, StorageBackend};

/// The Bijou application: configuration, database handle and the shared
/// services the controllers run against.
pub struct App {
    pub config: Config,
    pub db: DatabaseConnection,
    mailer: Arc<dyn Mailer>,
    storage: Arc<dyn StorageBackend>,
}

impl App {
    /// Create a new application from environment configuration.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::from_env()?;
        Self::with_config(config).await
    }

    /// Create a new application with a given config.
    pub async fn with_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let db = crate::db::connect(&config).await?;

        // Check for CLI database operations (--migrate, --rollback) and exit if present
        Self::handle_db_cli_args(&db).await?;

        let mailer = mailer::from_config(&config);
        let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(
            config.upload_dir.clone(),
            config.public_base_url.clone(),
        ));

        Ok(App {
            config,
            db,
            mailer,
            storage,
        })
    }

    /// Handle CLI database operations passed as command-line arguments.
    /// If --migrate or --rollback is detected, perform the operation and exit
    /// the process. The schema is never migrated implicitly at boot.
    async fn handle_db_cli_args(db: &DatabaseConnection) -> Result<(), Box<dyn std::error::Error>> {
        let args: Vec<String> = std::env::args().collect();

        if args.contains(&"--migrate".to_string()) {
            tracing::info!("Running pending database migrations...");
            Migrator::up(db, None).await?;
            tracing::info!("Migrations complete.");
            std::process::exit(0);
        }

        if let Some(pos) = args.iter().position(|arg| arg == "--rollback") {
            let steps = if pos + 1 < args.len() {
                args[pos + 1].parse::<u32>().unwrap_or(1)
            } else {
                1
            };
            tracing::info!("Rolling back {} migration(s)...", steps);
            Migrator::down(db, Some(steps)).await?;
            tracing::info!("Rollback complete.");
            std::process::exit(0);
        }

        Ok(())
    }

    /// Build the Axum router with every middleware layer applied.
    pub fn router(&self) -> Router {
        let state = AppState {
            db: self.db.clone(),
            config: Arc::new(self.config.clone()),
            mailer: self.mailer.clone(),
            storage: self.storage.clone(),
        };

        let mut router = build_router(state);

        // Only add expensive tracing/request-id middleware in development mode.
        if self.config.is_dev() {
            use tower_http::trace::DefaultMakeSpan;
            use tower_http::trace::DefaultOnRequest;
            use tower_http::trace::DefaultOnResponse;
            use tower_http::LatencyUnit;

            let x_request_id = axum::http::HeaderName::from_static("x-request-id");
            router = router
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(tracing::Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                );
        }

        router
    }

    /// Run the application server until ctrl-c.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.server_addr();
        let router = self.router();

        println!("\n🎬 Bijou server is running!");
        println!("   → Server:  http://{}", addr);
        println!("   → API docs: http://{}/docs", addr);
        println!();

        tracing::info!("Bijou server running on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

/// Assemble the application router for the given state.
///
/// Kept separate from [`App::router`] so integration tests can drive the
/// exact production routing stack against their own state.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    // Leave room above the image cap so oversized uploads still reach the
    // validator and get a structured 422 instead of a bare 413.
    let body_cap = (config.max_upload_size as usize) + 1_000_000;

    let openapi_spec = ApiDoc::openapi();
    let openapi_spec_clone = openapi_spec.clone();

    Router::new()
        .route("/", get(welcome))
        .merge(controllers::auth::routes())
        .merge(controllers::genres::routes())
        .merge(controllers::movies::routes())
        .merge(controllers::users::routes())
        .with_state(state)
        .nest_service("/images", ServeDir::new(&config.upload_dir))
        .merge(Scalar::with_url("/docs", openapi_spec))
        .route(
            "/docs/openapi.json",
            get(move || {
                let spec = openapi_spec_clone.clone();
                async move { axum::Json(spec) }
            }),
        )
        .layer(axum::Extension(config))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_cap))
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutting down Bijou server...");
}

// ═══ Application endpoints ═══

#[derive(Serialize)]
struct WelcomeMessage {
    message: &'static str,
    docs: &'static str,
    status: &'static str,
}

/// Welcome page at `/`.
async fn welcome() -> impl IntoResponse {
    axum::Json(WelcomeMessage {
        message: "Welcome to Bijou 🎬",
        docs: "/docs",
        status: "running",
    })
}
