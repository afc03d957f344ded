//! Dine Server - 堂食订单与桌台状态同步
//!
//! # 架构概述
//!
//! - **订单** (`orders`): 订单生命周期、每日订单号、金额计算
//! - **桌台** (`tables`): 桌台占用状态协调
//! - **实时** (`realtime`): 房间广播 (厨房、前厅、顾客)
//! - **认证** (`auth`): JWT 校验、角色
//! - **数据库** (`db`): SQLite 连接池、迁移、仓储
//! - **HTTP API** (`api`): RESTful 接口 + WebSocket
//!
//! # 模块结构
//!
//! ```text
//! dine-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT、提取器、角色
//! ├── api/           # HTTP 路由和处理器
//! ├── catalog.rs     # 商品目录
//! ├── tables/        # 桌台状态协调
//! ├── orders/        # 订单生命周期
//! ├── realtime/      # 事件总线
//! ├── utils/         # 日志、时区、错误
//! └── db/            # 数据库层
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod core;
pub mod db;
pub mod orders;
pub mod realtime;
pub mod tables;
pub mod utils;

// Re-export 公共类型
pub use auth::{Actor, CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::OrderManager;
pub use realtime::RoomHub;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ____  _
   / __ \(_)___  ___
  / / / / / __ \/ _ \
 / /_/ / / / / /  __/
/_____/_/_/ /_/\___/
    "#
    );
}
