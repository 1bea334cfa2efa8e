//! 服务器配置 - 订单接入服务的所有配置项

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/storefront | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | BUS_CAPACITY | 1024 | 消息总线通道容量 |
/// | FRAUD_CHECK_URL | (未设置=关闭) | 外部风控评分端点 |
/// | FRAUD_CHECK_TIMEOUT_MS | 10000 | 风控调用超时(毫秒) |
/// | GEO_LOOKUP_URL | (未设置=关闭) | IP 归属地查询端点 |
/// | EMAIL_API_URL | (未设置=关闭) | 邮件服务商端点 |
/// | EMAIL_API_KEY | (未设置) | 邮件服务商密钥 |
/// | TRACKING_URL | (未设置=关闭) | 广告购买事件回传端点 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/storefront HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 消息总线通道容量
    pub bus_capacity: usize,

    // === 外部协作方 ===
    /// 风控评分端点 (未设置 = 功能关闭)
    pub fraud_check_url: Option<String>,
    /// 风控调用超时 (毫秒)
    pub fraud_check_timeout_ms: u64,
    /// IP 归属地查询端点
    pub geo_lookup_url: Option<String>,
    /// 邮件服务商端点
    pub email_api_url: Option<String>,
    /// 邮件服务商密钥
    pub email_api_key: Option<String>,
    /// 广告平台购买事件回传端点
    pub tracking_url: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/storefront".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            bus_capacity: std::env::var("BUS_CAPACITY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1024),

            fraud_check_url: std::env::var("FRAUD_CHECK_URL").ok(),
            fraud_check_timeout_ms: std::env::var("FRAUD_CHECK_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10_000),
            geo_lookup_url: std::env::var("GEO_LOOKUP_URL").ok(),
            email_api_url: std::env::var("EMAIL_API_URL").ok(),
            email_api_key: std::env::var("EMAIL_API_KEY").ok(),
            tracking_url: std::env::var("TRACKING_URL").ok(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库文件路径
    pub fn database_path(&self) -> String {
        format!("{}/database/storefront.db", self.work_dir)
    }

    /// 确保工作目录结构存在 (RocksDB 不会自己建父目录)
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(format!("{}/database", self.work_dir))
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

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
