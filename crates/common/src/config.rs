use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Redis connection string (dispatch queue lives here)
    pub redis_url: String,

    /// Name of the Redis list carrying notification ids to dispatch
    pub dispatch_queue: String,

    /// SendGrid API key for outbound mail
    pub sendgrid_api_key: String,

    /// Sender address for every outbound email
    pub from_email: String,

    /// Maximum number of PostgreSQL connections in the pool (default: 5)
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Missing required variables are a startup error, not a per-run one.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            dispatch_queue: std::env::var("DISPATCH_QUEUE")
                .unwrap_or_else(|_| "notification:dispatch".to_string()),
            sendgrid_api_key: std::env::var("SENDGRID_API_KEY").map_err(|_| {
                anyhow::anyhow!("SENDGRID_API_KEY environment variable is required")
            })?,
            from_email: std::env::var("FROM_EMAIL")
                .map_err(|_| anyhow::anyhow!("FROM_EMAIL environment variable is required"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
        })
    }
}
