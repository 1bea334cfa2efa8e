//! Storefront Server - 多租户电商订单接入服务
//!
//! # 架构概述
//!
//! 本模块是订单接入后端的主入口，提供以下核心功能：
//!
//! - **订单接入** (`checkout`): 库存校验、黑名单拦截、联盟归因、下单落库
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储，按商户隔离
//! - **消息总线** (`message`): 商户仪表盘实时事件
//! - **外部服务** (`services`): 邮件、风控评分、IP 归属地、广告回传
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── checkout/      # 订单接入流水线
//! ├── db/            # 数据库层 (models + repository)
//! ├── message/       # 消息总线
//! ├── services/      # 外部服务客户端
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod checkout;
pub mod core;
pub mod db;
pub mod message;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use crate::checkout::{CheckoutError, CheckoutService};
pub use crate::core::{Config, Server, ServerState};
pub use crate::message::{BusMessage, EventType, MessageBus};
pub use crate::utils::{AppError, AppResult};

// Re-export logger functions
pub use crate::utils::logger::{init_logger, init_logger_with_file};
