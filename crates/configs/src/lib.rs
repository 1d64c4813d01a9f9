use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    /// "development" or "production"; controls the Secure flag on cookies.
    pub env: String,
    /// Base URL embedded in password-reset emails.
    pub reset_password_base_url: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            env: "development".into(),
            reset_password_base_url: "http://localhost:3000/reset-password".into(),
        }
    }
}

impl AppSection {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout_secs: 30,
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub reset_secret: String,
    #[serde(default = "default_access_expiry")]
    pub access_expiry_secs: i64,
    #[serde(default = "default_refresh_expiry")]
    pub refresh_expiry_secs: i64,
    #[serde(default = "default_reset_expiry")]
    pub reset_expiry_secs: i64,
}

fn default_access_expiry() -> i64 { 60 * 60 }
// Refresh expiry matches the one-year cookie max age set by the server.
fn default_refresh_expiry() -> i64 { 60 * 60 * 24 * 365 }
fn default_reset_expiry() -> i64 { 60 * 10 }

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            reset_secret: String::new(),
            access_expiry_secs: default_access_expiry(),
            refresh_expiry_secs: default_refresh_expiry(),
            reset_expiry_secs: default_reset_expiry(),
        }
    }
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load from `config.toml` when present, otherwise start from defaults;
    /// env vars fill any gaps either way, then everything is validated.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default().unwrap_or_default();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.app.normalize_from_env();
        self.server.normalize_from_env()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.jwt.normalize_from_env();
        self.jwt.validate()?;
        Ok(())
    }
}

impl AppSection {
    fn normalize_from_env(&mut self) {
        if let Ok(env) = std::env::var("APP_ENV") {
            self.env = env;
        }
        if let Ok(url) = std::env::var("RESET_PASSWORD_BASE_URL") {
            self.reset_password_base_url = url;
        }
    }
}

impl ServerConfig {
    fn normalize_from_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!(
                "database.url is empty; set it in config.toml or via DATABASE_URL"
            ));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(anyhow!("database.connect_timeout_secs must be a positive number of seconds"));
        }
        Ok(())
    }
}

impl JwtConfig {
    fn normalize_from_env(&mut self) {
        if let Ok(v) = std::env::var("JWT_ACCESS_SECRET") {
            self.access_secret = v;
        }
        if let Ok(v) = std::env::var("JWT_REFRESH_SECRET") {
            self.refresh_secret = v;
        }
        if let Ok(v) = std::env::var("JWT_RESET_SECRET") {
            self.reset_secret = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.access_secret.trim().is_empty()
            || self.refresh_secret.trim().is_empty()
            || self.reset_secret.trim().is_empty()
        {
            return Err(anyhow!(
                "jwt secrets are required; set jwt.* in config.toml or JWT_ACCESS_SECRET / JWT_REFRESH_SECRET / JWT_RESET_SECRET"
            ));
        }
        if self.access_expiry_secs <= 0
            || self.refresh_expiry_secs <= 0
            || self.reset_expiry_secs <= 0
        {
            return Err(anyhow!("jwt expiries must be positive seconds"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let toml_src = r#"
            [app]
            env = "production"
            reset_password_base_url = "https://app.example.com/reset-password"

            [server]
            host = "0.0.0.0"
            port = 9000

            [database]
            url = "postgres://u:p@localhost:5432/org"

            [jwt]
            access_secret = "a"
            refresh_secret = "r"
            reset_secret = "s"
            access_expiry_secs = 900
        "#;
        let cfg: AppConfig = toml::from_str(toml_src).unwrap();
        assert!(cfg.app.is_production());
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.jwt.access_expiry_secs, 900);
        assert_eq!(cfg.jwt.refresh_expiry_secs, 60 * 60 * 24 * 365);
        cfg.database.validate().unwrap();
        cfg.jwt.validate().unwrap();
    }

    #[test]
    fn rejects_non_postgres_url() {
        let db = DatabaseConfig { url: "mysql://x".into(), ..Default::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn rejects_missing_jwt_secrets() {
        let jwt = JwtConfig::default();
        assert!(jwt.validate().is_err());
    }
}
