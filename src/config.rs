use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 全局配置单例
static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }
    // 避开 React/Node 常用的 3000 端口
    fn default_port() -> u16 {
        5000
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 文件路径（不存在时自动创建）
    #[serde(default = "DatabaseConfig::default_sqlite_path")]
    pub sqlite_path: String,
    /// 是否启用 WAL
    #[serde(default = "DatabaseConfig::default_sqlite_wal")]
    pub sqlite_wal: bool,
}

impl DatabaseConfig {
    fn default_sqlite_path() -> String {
        "./data/qr_backend.db".to_string()
    }
    fn default_sqlite_wal() -> bool {
        true
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: Self::default_sqlite_path(),
            sqlite_wal: Self::default_sqlite_wal(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API 路由前缀
    #[serde(default = "ApiConfig::default_prefix")]
    pub prefix: String,
}

impl ApiConfig {
    fn default_prefix() -> String {
        "/api".to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: Self::default_prefix(),
        }
    }
}

/// 静态文件配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticConfig {
    /// 静态文件根目录
    #[serde(default = "StaticConfig::default_root")]
    pub root: String,
    /// 单页应用入口文件（用于 `/login` 与未匹配路径回退）
    #[serde(default = "StaticConfig::default_spa_entry")]
    pub spa_entry: String,
}

impl StaticConfig {
    fn default_root() -> String {
        "./static".to_string()
    }
    fn default_spa_entry() -> String {
        "index.html".to_string()
    }

    /// 静态文件根目录路径
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }

    /// SPA 入口文件完整路径
    pub fn spa_entry_path(&self) -> PathBuf {
        self.root_path().join(&self.spa_entry)
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            root: Self::default_root(),
            spa_entry: Self::default_spa_entry(),
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// 是否启用 CORS
    #[serde(default = "CorsConfig::default_enabled")]
    pub enabled: bool,
    /// 允许的 Origin 列表（支持 "*" 表示任意，但不能与凭证同时使用）
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// 是否允许携带凭证（会话 Cookie 依赖此项）
    #[serde(default = "CorsConfig::default_allow_credentials")]
    pub allow_credentials: bool,
    /// 预检缓存时间（秒）
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

impl CorsConfig {
    fn default_enabled() -> bool {
        true
    }
    fn default_allow_credentials() -> bool {
        true
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            // 开发期前端常用的本地源
            allowed_origins: vec![
                "http://127.0.0.1:5500".to_string(),
                "http://localhost:5500".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:8000".to_string(),
                "http://localhost:8000".to_string(),
            ],
            allow_credentials: Self::default_allow_credentials(),
            max_age_secs: None,
        }
    }
}

/// 会话配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 会话 Cookie 名称
    #[serde(default = "SessionConfig::default_cookie_name")]
    pub cookie_name: String,
    /// 会话签名密钥（留空则启动时随机生成，重启后所有会话失效）
    #[serde(default)]
    pub secret: String,
    /// 会话有效期（秒）
    #[serde(default = "SessionConfig::default_ttl")]
    pub ttl_secs: u64,
    /// Cookie 是否仅在 HTTPS 下发送
    #[serde(default)]
    pub secure: bool,
}

impl SessionConfig {
    fn default_cookie_name() -> String {
        "qr_session".to_string()
    }
    fn default_ttl() -> u64 {
        7 * 24 * 3600
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: Self::default_cookie_name(),
            secret: String::new(),
            ttl_secs: Self::default_ttl(),
            secure: false,
        }
    }
}

/// 密码哈希算法
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PasswordAlgorithm {
    /// Argon2id（默认，内存硬化）
    #[default]
    Argon2,
    /// PBKDF2-HMAC-SHA256
    Pbkdf2,
}

/// 密码哈希配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// 哈希算法选择
    #[serde(default)]
    pub algorithm: PasswordAlgorithm,
    /// PBKDF2 迭代次数（仅 pbkdf2 生效）
    #[serde(default = "PasswordConfig::default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,
}

impl PasswordConfig {
    fn default_pbkdf2_iterations() -> u32 {
        600_000
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            algorithm: PasswordAlgorithm::default(),
            pbkdf2_iterations: Self::default_pbkdf2_iterations(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 静态文件配置
    #[serde(default, rename = "static")]
    pub static_files: StaticConfig,
    /// CORS 配置
    #[serde(default)]
    pub cors: CorsConfig,
    /// 会话配置
    #[serde(default)]
    pub session: SessionConfig,
    /// 密码哈希配置
    #[serde(default)]
    pub password: PasswordConfig,
}

impl AppConfig {
    /// 从配置文件加载配置，支持环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path();

        tracing::info!("正在从 {:?} 加载配置文件", config_path);

        let builder = ConfigBuilder::builder()
            // 加载配置文件（可缺省，缺省时使用内置默认值）
            .add_source(File::with_name(config_path.to_str().unwrap()).required(false))
            // 支持环境变量覆盖，例如：APP_SERVER_PORT
            .add_source(
                Environment::with_prefix("APP")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = builder.try_deserialize()?;

        Ok(config)
    }

    /// 获取全局配置单例
    pub fn global() -> &'static AppConfig {
        CONFIG.get().expect("配置未初始化，请先调用 init_global()")
    }

    /// 初始化全局配置
    pub fn init_global() -> Result<(), ConfigError> {
        let config = Self::load()?;
        CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("配置已经被初始化".to_string()))?;
        Ok(())
    }

    /// 获取配置文件路径
    fn get_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            api: ApiConfig::default(),
            database: DatabaseConfig::default(),
            static_files: StaticConfig::default(),
            cors: CorsConfig::default(),
            session: SessionConfig::default(),
            password: PasswordConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, PasswordAlgorithm};

    #[test]
    fn default_config_is_consistent() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server_addr(), "0.0.0.0:5000");
        assert_eq!(cfg.api.prefix, "/api");
        assert_eq!(cfg.session.cookie_name, "qr_session");
        assert_eq!(cfg.password.algorithm, PasswordAlgorithm::Argon2);
        assert!(cfg.cors.allow_credentials);
        assert!(!cfg.cors.allowed_origins.is_empty());
    }

    #[test]
    fn static_paths_join_root_and_entry() {
        let cfg = AppConfig::default();
        assert!(
            cfg.static_files
                .spa_entry_path()
                .ends_with("static/index.html")
        );
    }
}
