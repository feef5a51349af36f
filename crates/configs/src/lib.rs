use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub app: AppSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 3000, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Process-wide behaviour switches.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for AppSection {
    fn default() -> Self {
        Self { environment: default_environment(), log_format: LogFormat::default() }
    }
}

fn default_environment() -> String { "development".into() }

impl AppSection {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}

/// `CONFIG_PATH`, or `config.toml` in the working directory.
pub fn default_config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file first; only when it does not exist, defaults overlaid with
    /// `SERVER_HOST`, `SERVER_PORT`/`PORT`, `DATABASE_URL`, `APP_ENV`, `LOG_FORMAT`.
    /// A file that exists but fails to read or parse is an error.
    pub fn load_and_validate() -> Result<Self> {
        Self::load_and_validate_from(&default_config_path())
    }

    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => Self::from_env(),
            Err(e) => return Err(e.context(format!("failed to load config file {path}"))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        let port = std::env::var("SERVER_PORT").or_else(|_| std::env::var("PORT"));
        if let Some(p) = port.ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = p;
        }
        if let Ok(env) = std::env::var("APP_ENV") {
            cfg.app.environment = env;
        }
        if let Ok(fmt) = std::env::var("LOG_FORMAT") {
            if fmt.eq_ignore_ascii_case("json") {
                cfg.app.log_format = LogFormat::Json;
            }
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
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
            return Err(anyhow!("database.url is empty; set it in config.toml or via DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let cfg = load_from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            worker_threads = 2

            [database]
            url = "postgres://songs:secret@db:5432/songs"
            max_connections = 5
            min_connections = 1

            [app]
            environment = "production"
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert_eq!(cfg.database.max_connections, 5);
        assert_eq!(cfg.database.acquire_timeout_secs, 30);
        assert!(cfg.app.is_production());
        assert_eq!(cfg.app.log_format, LogFormat::Json);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg = load_from_str("[database]\nurl = \"sqlite::memory:\"\n").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.database.min_connections, 2);
        assert!(!cfg.app.is_production());
        assert_eq!(cfg.app.log_format, LogFormat::Compact);
    }

    #[test]
    fn broken_config_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("songs-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[server]\nport = \"not-a-number\"\n[database]\nurl = \"sqlite::memory:\"\n[app]\nenvironment = \"production\"\n",
        )
        .unwrap();
        let res = AppConfig::load_and_validate_from(path.to_str().unwrap());
        let _ = std::fs::remove_file(&path);
        assert!(res.is_err());
    }

    #[test]
    fn missing_config_file_is_detected() {
        let err = load_from_file("/nonexistent-dir/songs-config.toml").unwrap_err();
        assert!(is_not_found(&err));

        let parse_err = load_from_str("port = [").unwrap_err();
        assert!(!is_not_found(&parse_err));
    }

    #[test]
    fn rejects_unknown_scheme() {
        let db = DatabaseConfig { url: "mongodb://localhost:27017".into(), ..Default::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let db = DatabaseConfig {
            url: "postgres://localhost/songs".into(),
            max_connections: 1,
            min_connections: 3,
            ..Default::default()
        };
        assert!(db.validate().is_err());
    }

    #[test]
    fn normalize_fills_zero_workers_and_blank_host() {
        let mut server = ServerConfig { host: "  ".into(), port: 9000, worker_threads: Some(0) };
        server.normalize().unwrap();
        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.worker_threads, Some(4));
        assert_eq!(server.bind_addr().unwrap().port(), 9000);
    }
}
