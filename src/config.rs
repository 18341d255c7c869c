use serde::Deserialize;

/// Default upstream used to enrich new leads with a birth date.
const DEFAULT_BIRTH_DATE_API_URL: &str = "https://dummyjson.com/users/1";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mongo_url: String,
    pub database_name: String,
    pub port: u16,
    pub birth_date_api_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            mongo_url: std::env::var("MONGO_URL")
                .map_err(|_| anyhow::anyhow!("MONGO_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("MONGO_URL cannot be empty");
                    }
                    if !url.starts_with("mongodb://") && !url.starts_with("mongodb+srv://") {
                        anyhow::bail!("MONGO_URL must start with mongodb:// or mongodb+srv://");
                    }
                    Ok(url)
                })?,
            database_name: std::env::var("DATABASE_NAME")
                .map_err(|_| anyhow::anyhow!("DATABASE_NAME environment variable required"))
                .and_then(|name| {
                    if name.trim().is_empty() {
                        anyhow::bail!("DATABASE_NAME cannot be empty");
                    }
                    Ok(name)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            birth_date_api_url: std::env::var("BIRTH_DATE_API_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BIRTH_DATE_API_URL.to_string()),
        };

        // Log successful configuration load (without credentials embedded in the URL)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database name: {}", config.database_name);
        tracing::debug!("Birth date API: {}", config.birth_date_api_url);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
