//! 消息总线核心实现
//!
//! # 消息流
//!
//! ```text
//! CheckoutService ──▶ publish() ──▶ server_tx ──▶ 订阅者 (仪表盘会话 / 测试)
//! ```
//!
//! 纯进程内实现：tokio broadcast 通道承载全部事件，订阅方自行
//! 按 `BusMessage::merchant` 过滤。没有订阅者时发布不算错误。

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::BusMessage;

/// Configuration for the bus channel
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Capacity of the broadcast channel (default: 1024)
    pub channel_capacity: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// 消息总线 - 负责服务端事件广播
#[derive(Debug, Clone)]
pub struct MessageBus {
    /// 服务器到订阅者的广播通道
    server_tx: broadcast::Sender<BusMessage>,
    /// 关闭信号令牌
    shutdown_token: CancellationToken,
}

impl MessageBus {
    /// 创建默认配置的消息总线
    pub fn new() -> Self {
        Self::from_config(BusConfig::default())
    }

    /// 从配置创建消息总线
    pub fn from_config(config: BusConfig) -> Self {
        let (server_tx, _) = broadcast::channel(config.channel_capacity);
        Self {
            server_tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 创建指定容量的消息总线
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_config(BusConfig {
            channel_capacity: capacity,
        })
    }

    /// 发布消息 (服务器 -> 所有订阅者)
    ///
    /// 返回收到消息的订阅者数量。没有订阅者时返回 0，不算错误。
    pub fn publish(&self, msg: BusMessage) -> usize {
        self.server_tx.send(msg).unwrap_or(0)
    }

    /// 订阅服务器广播
    ///
    /// 订阅方按 `BusMessage::merchant` 自行过滤
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.server_tx.subscribe()
    }

    /// 获取广播发送端 (高级用法)
    pub fn sender(&self) -> &broadcast::Sender<BusMessage> {
        &self.server_tx
    }

    /// 获取关闭令牌 (用于监控关闭信号)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 优雅关闭消息总线
    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
