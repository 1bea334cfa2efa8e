//! 服务模块 - 消息总线封装与外部协作方客户端
//!
//! # 内容
//!
//! - [`MessageBusService`] - 消息总线生命周期管理
//! - [`CacheTagRegistry`] - 缓存标签版本注册表
//! - [`EmailService`] - 事务邮件投递
//! - [`FraudScoreClient`] - 外部风控评分
//! - [`GeoClient`] - IP 归属地查询
//! - [`TrackingClient`] - 广告平台购买事件回传
//!
//! 外部客户端统一遵循：未配置端点 = 功能关闭（debug 日志后直接返回），
//! 调用失败由调用方记日志吞掉，绝不影响下单主流程。

pub mod bus;
pub mod cache;
pub mod email;
pub mod fraud;
pub mod geo;
pub mod tracking;

pub use bus::MessageBusService;
pub use cache::CacheTagRegistry;
pub use email::EmailService;
pub use fraud::FraudScoreClient;
pub use geo::GeoClient;
pub use tracking::TrackingClient;
