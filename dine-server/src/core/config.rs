use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::orders::SequenceConfig;
use crate::utils::time;
use crate::utils::{AppError, AppResult};

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | DATABASE_URL | sqlite:{WORK_DIR}/dine.db | SQLite 地址 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | BUSINESS_TIMEZONE | UTC | 营业日时区 (IANA) |
/// | ORDER_NUMBER_MAX_RETRIES | 5 | 订单号重试次数 |
/// | ORDER_NUMBER_BACKOFF_MS | 100 | 订单号重试间隔基数 |
/// | QR_RATE_LIMIT_PER_MINUTE | 5 | 扫码下单每 IP 每分钟上限 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | - | 日志文件目录 (不设置则只输出到终端) |
/// | LOG_JSON | false | JSON 格式日志 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/dine BUSINESS_TIMEZONE=Europe/Madrid cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    pub database_url: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | production
    pub environment: String,
    /// 营业日所在时区
    pub timezone: Tz,
    pub sequence: SequenceConfig,
    pub qr_rate_limit_per_minute: u32,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置的变量使用默认值；时区名或 JWT 配置无效时返回错误
    pub fn from_env() -> AppResult<Self> {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite:{}", PathBuf::from(&work_dir).join("dine.db").display()));
        let timezone = time::parse_timezone(
            &std::env::var("BUSINESS_TIMEZONE").unwrap_or_else(|_| "UTC".into()),
        )?;
        let jwt = JwtConfig::from_env()
            .map_err(|e| AppError::internal(format!("Invalid JWT configuration: {e}")))?;

        Ok(Self {
            work_dir,
            database_url,
            http_port: env_or("HTTP_PORT", 3000),
            jwt,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            timezone,
            sequence: SequenceConfig {
                max_attempts: env_or("ORDER_NUMBER_MAX_RETRIES", 5).max(1),
                backoff: Duration::from_millis(env_or("ORDER_NUMBER_BACKOFF_MS", 100)),
            },
            qr_rate_limit_per_minute: env_or("QR_RATE_LIMIT_PER_MINUTE", 5),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            log_json: env_or("LOG_JSON", false),
        })
    }

    /// 测试配置: 内存数据库、固定密钥
    pub fn for_tests() -> Self {
        Self {
            work_dir: ".".into(),
            database_url: "sqlite::memory:".into(),
            http_port: 0,
            jwt: JwtConfig {
                secret: "test-secret-that-is-long-enough-for-hs256".into(),
                expiration_minutes: 60,
                issuer: "dine-auth".into(),
                audience: "dine-clients".into(),
            },
            environment: "development".into(),
            timezone: chrono_tz::UTC,
            sequence: SequenceConfig {
                max_attempts: 5,
                backoff: Duration::from_millis(1),
            },
            qr_rate_limit_per_minute: 5,
            request_timeout_ms: 30000,
            log_level: "info".into(),
            log_dir: None,
            log_json: false,
        }
    }

    /// 确保工作目录存在
    pub fn ensure_work_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
