use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::core::ServerError;
use crate::notifications::ChannelKind;

/// 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// tracing EnvFilter 指令，如 `info` 或 `storefront_server=debug,tower_http=info`
    pub level: String,
    /// 日志目录 (按天滚动)，为空则只输出到 stdout
    pub dir: Option<String>,
    /// JSON 格式输出
    pub json: bool,
}

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_HOST | 0.0.0.0 | 监听地址 |
/// | HTTP_PORT | 8000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | DATABASE_URL | sqlite:storefront.db | SQLite 连接串 |
/// | DB_MAX_CONNECTIONS | 5 | 连接池大小 |
/// | LOG_LEVEL | info | 日志级别 / EnvFilter |
/// | LOG_DIR | - | 日志目录 |
/// | LOG_JSON | false | JSON 日志 |
/// | JWT_SECRET | - | JWT 密钥 (开发环境可省略) |
/// | ORDER_NUMBER_PREFIX | RB | 订单号前缀 |
/// | BUSINESS_TIMEZONE | Asia/Manila | 业务时区 (订单号日期、日报) |
/// | NOTIFICATION_CHANNELS | database,broadcast | 通知通道 |
/// | SEED_DEMO_DATA | 开发环境 true | 空库时写入默认分类 |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=9000 DATABASE_URL=sqlite:/data/shop.db cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log: LogConfig,
    pub jwt: JwtConfig,
    pub order_number_prefix: String,
    pub business_tz: Tz,
    pub notification_channels: Vec<ChannelKind>,
    pub seed_demo_data: bool,
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过任意键值来源加载配置 (测试中传入固定表)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let is_development = environment == "development";

        let http_port = match lookup("HTTP_PORT") {
            Some(p) => p
                .parse()
                .map_err(|_| ServerError::Config(format!("HTTP_PORT is not a port: {p}")))?,
            None => 8000,
        };

        let business_tz = match lookup("BUSINESS_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| ServerError::Config(format!("Unknown BUSINESS_TIMEZONE: {name}")))?,
            None => chrono_tz::Asia::Manila,
        };

        let notification_channels = match lookup("NOTIFICATION_CHANNELS") {
            Some(list) => ChannelKind::parse_list(&list).map_err(ServerError::Config)?,
            None => vec![ChannelKind::Database, ChannelKind::Broadcast],
        };

        let order_number_prefix = lookup("ORDER_NUMBER_PREFIX").unwrap_or_else(|| "RB".into());
        if order_number_prefix.is_empty() || !order_number_prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ServerError::Config(format!(
                "ORDER_NUMBER_PREFIX must be non-empty ASCII alphanumerics: {order_number_prefix}"
            )));
        }

        let jwt = JwtConfig::from_lookup(&lookup, is_development)
            .map_err(|e| ServerError::Config(e.to_string()))?;

        Ok(Self {
            http_host: lookup("HTTP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            http_port,
            environment,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "sqlite:storefront.db".into()),
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            log: LogConfig {
                level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
                dir: lookup("LOG_DIR").filter(|d| !d.is_empty()),
                json: parse_bool(lookup("LOG_JSON"), false),
            },
            jwt,
            order_number_prefix,
            business_tz,
            notification_channels,
            seed_demo_data: parse_bool(lookup("SEED_DEMO_DATA"), is_development),
        })
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    match value {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}
