use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL (e.g. sqlite://bijou.db, postgres://...)
    pub database_url: String,

    /// Signing secret for short-lived access tokens (required)
    pub access_token_secret: String,

    /// Signing secret for refresh tokens (required, distinct from access)
    pub refresh_token_secret: String,

    /// Access token expiry in seconds (default: 60)
    pub access_token_ttl_secs: i64,

    /// Refresh token expiry in seconds (default: 86400, one day)
    pub refresh_token_ttl_secs: i64,

    /// Verification code expiry in seconds (default: 86400, one day)
    pub verification_code_ttl_secs: i64,

    /// Max verification re-issues per user; unset means unlimited
    pub verification_resend_limit: Option<u32>,

    /// Server host (default: 127.0.0.1)
    pub server_host: String,

    /// Server port (default: 3000)
    pub server_port: u16,

    /// Environment: development, production, test
    pub environment: String,

    /// Root directory for stored images (default: ./public/images)
    pub upload_dir: String,

    /// Max upload file size in bytes (default: 5MB)
    pub max_upload_size: u64,

    /// Public base URL used when building image URLs (default: http://localhost:3000)
    pub public_base_url: String,

    /// HTTP mail API endpoint (optional; emails are logged when unset)
    pub mail_api_url: Option<String>,

    /// HTTP mail API key (optional)
    pub mail_api_key: Option<String>,

    /// Sender address for outgoing mail
    pub mail_from_email: String,

    /// Sender display name for outgoing mail
    pub mail_from_name: String,
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    ///
    /// The two JWT secrets have no defaults; startup fails without them.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://bijou.db?mode=rwc".to_string()),
            access_token_secret: std::env::var("ACCESS_TOKEN_SECRET")
                .map_err(|_| "ACCESS_TOKEN_SECRET is not set")?,
            refresh_token_secret: std::env::var("REFRESH_TOKEN_SECRET")
                .map_err(|_| "REFRESH_TOKEN_SECRET is not set")?,
            access_token_ttl_secs: std::env::var("ACCESS_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            refresh_token_ttl_secs: std::env::var("REFRESH_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .unwrap_or(86_400),
            verification_code_ttl_secs: std::env::var("VERIFICATION_CODE_TTL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .unwrap_or(86_400),
            verification_resend_limit: std::env::var("VERIFICATION_RESEND_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok()),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "./public/images".to_string()),
            max_upload_size: std::env::var("MAX_UPLOAD_SIZE")
                .unwrap_or_else(|_| "5000000".to_string()) // 5MB
                .parse()
                .unwrap_or(5_000_000),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            mail_api_url: std::env::var("MAIL_API_URL").ok(),
            mail_api_key: std::env::var("MAIL_API_KEY").ok(),
            mail_from_email: std::env::var("MAIL_FROM_EMAIL")
                .unwrap_or_else(|_| "no-reply@bijou.app".to_string()),
            mail_from_name: std::env::var("MAIL_FROM_NAME")
                .unwrap_or_else(|_| "Bijou".to_string()),
        })
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Public URL of a stored image.
    pub fn image_url(&self, category: &str, file_name: &str) -> String {
        format!("{}/images/{}/{}", self.public_base_url, category, file_name)
    }

    /// Avatar URL used when registration carries no image.
    pub fn default_avatar_url(&self) -> String {
        self.image_url("users", "default.png")
    }

    /// Poster URL used when a movie carries no image.
    pub fn default_poster_url(&self) -> String {
        self.image_url("posters", "default.png")
    }
}
