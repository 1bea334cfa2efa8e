//! 消息总线消息类型定义
//!
//! 服务端产生的实时事件（订单更新、通知）通过总线广播，
//! 按商户字段路由到对应的仪表盘频道。

mod bus;

pub use bus::{BusConfig, MessageBus};

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 消息总线事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// 订单创建/变更
    OrderUpdate,
    /// 商户用户通知
    Notification,
    /// 资源同步信号
    Sync,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::OrderUpdate => write!(f, "order_update"),
            EventType::Notification => write!(f, "notification"),
            EventType::Sync => write!(f, "sync"),
        }
    }
}

/// 总线消息 - 只包含业务必需字段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusMessage {
    pub event_type: EventType,
    /// 目标商户 (仪表盘频道按商户划分)
    pub merchant: String,
    pub payload: serde_json::Value,
    /// 用于消息追踪
    pub request_id: Uuid,
}

impl BusMessage {
    /// 创建新消息
    pub fn new<T: Serialize>(event_type: EventType, merchant: impl Into<String>, data: &T) -> Self {
        Self {
            event_type,
            merchant: merchant.into(),
            payload: serde_json::to_value(data).unwrap_or(serde_json::Value::Null),
            request_id: Uuid::new_v4(),
        }
    }

    /// 订单更新事件
    pub fn order_update<T: Serialize>(merchant: impl Into<String>, data: &T) -> Self {
        Self::new(EventType::OrderUpdate, merchant, data)
    }

    /// 通知事件
    pub fn notification<T: Serialize>(merchant: impl Into<String>, data: &T) -> Self {
        Self::new(EventType::Notification, merchant, data)
    }

    /// 同步信号
    pub fn sync<T: Serialize>(merchant: impl Into<String>, data: &T) -> Self {
        Self::new(EventType::Sync, merchant, data)
    }
}
