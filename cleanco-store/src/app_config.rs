use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres connection string. Without one the in-memory store is used.
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub access_token_secret: String,
    pub token_expiration_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// JSON array of services loaded into the in-memory store at startup.
    pub seed_path: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .set_default("server.port", 5000)?
            .set_default("database.max_connections", 5)?
            .set_default("auth.token_expiration_seconds", 3600)?
            .set_default("cors.allowed_origins", vec!["http://localhost:5173"])?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `CLEANCO_SERVER__PORT=8080`
            .add_source(
                config::Environment::with_prefix("CLEANCO")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            // Plain variables used by existing deployments win over everything.
            .set_override_option("server.port", env::var("PORT").ok())?
            .set_override_option("auth.access_token_secret", env::var("ACCESS_TOKEN_SECRET").ok())?
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?;

        s.try_deserialize()
    }
}
