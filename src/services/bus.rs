//! 消息总线服务
//!
//! 封装 MessageBus，提供：
//! - 后台事件监控
//! - 生命周期管理

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::core::Config;
use crate::message::{BusConfig, MessageBus};

/// 消息总线服务
#[derive(Clone, Debug)]
pub struct MessageBusService {
    /// 消息总线实例
    bus: Arc<MessageBus>,
}

impl MessageBusService {
    /// 创建消息总线服务
    pub fn new(config: &Config) -> Self {
        let bus_config = BusConfig {
            channel_capacity: config.bus_capacity,
        };
        Self {
            bus: Arc::new(MessageBus::from_config(bus_config)),
        }
    }

    /// 获取消息总线引用
    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// 启动后台事件监控
    ///
    /// 订阅全部事件打 debug 日志，关闭信号到达后退出。
    pub fn start_background_tasks(&self) {
        let mut rx = self.bus.subscribe();
        let token = self.bus.shutdown_token().clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(m) => {
                            tracing::debug!(
                                target: "bus",
                                event = %m.event_type,
                                merchant = %m.merchant,
                                "Bus event"
                            );
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(target: "bus", skipped, "Bus monitor lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!(target: "bus", "Bus monitor stopped");
        });

        tracing::debug!("Message bus monitor started in background");
    }
}
