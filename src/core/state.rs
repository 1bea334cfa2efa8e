//! 服务器状态 - 持有所有服务的单例引用
//!
//! ServerState 是订单接入服务的核心数据结构，持有所有服务的共享引用。
//! 使用 Arc 实现浅拷贝，所有权成本极低。

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;
use crate::db::models::{Notification, Order};
use crate::message::{BusMessage, MessageBus};
use crate::services::{
    CacheTagRegistry, EmailService, FraudScoreClient, GeoClient, MessageBusService, TrackingClient,
};

/// 服务器状态
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | message_bus | MessageBusService | 消息总线服务 |
/// | email | EmailService | 事务邮件投递 |
/// | fraud | FraudScoreClient | 外部风控评分 |
/// | geo | GeoClient | IP 归属地查询 |
/// | tracking | TrackingClient | 广告购买事件回传 |
/// | cache_tags | Arc<CacheTagRegistry> | 缓存标签版本注册表 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 消息总线服务
    pub message_bus: MessageBusService,
    /// 事务邮件投递
    pub email: EmailService,
    /// 外部风控评分
    pub fraud: FraudScoreClient,
    /// IP 归属地查询
    pub geo: GeoClient,
    /// 广告购买事件回传
    pub tracking: TrackingClient,
    /// 缓存标签版本注册表
    pub cache_tags: Arc<CacheTagRegistry>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录下的嵌入式数据库
    /// 2. 各服务 (MessageBus, Email, Fraud, Geo, Tracking)
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_path();
        let db_service = DbService::new(&db_path)
            .await
            .expect("Failed to initialize database");

        Self::with_db(config, db_service.db)
    }

    /// 使用给定的数据库句柄构造状态 (测试用内存库走这里)
    pub fn with_db(config: &Config, db: Surreal<Db>) -> Self {
        Self {
            config: config.clone(),
            db,
            message_bus: MessageBusService::new(config),
            email: EmailService::new(config),
            fraud: FraudScoreClient::new(config),
            geo: GeoClient::new(config),
            tracking: TrackingClient::new(config),
            cache_tags: Arc::new(CacheTagRegistry::new()),
        }
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用
    pub fn start_background_tasks(&self) {
        self.message_bus.start_background_tasks();
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取消息总线
    pub fn bus(&self) -> &Arc<MessageBus> {
        self.message_bus.bus()
    }

    /// 广播订单更新到商户仪表盘频道
    pub fn publish_order_update(&self, merchant: &str, order: &Order) {
        self.bus().publish(BusMessage::order_update(merchant, order));
    }

    /// 广播通知事件到商户仪表盘频道
    pub fn publish_notification(&self, merchant: &str, notification: &Notification) {
        self.bus()
            .publish(BusMessage::notification(merchant, notification));
    }
}
