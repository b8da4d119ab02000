//! 数据模型定义
//!
//! 每个业务模块分为 `entities`（业务实体）、`requests`（请求 DTO）和 `responses`（响应 DTO）。
//! 请求与响应的 JSON 字段统一使用 camelCase。

pub mod auth;
pub mod class_users;
pub mod classes;
pub mod common;
pub mod grades;
pub mod notifications;
pub mod reviews;
pub mod users;

pub use common::pagination::{PaginationInfo, PaginationQuery};
pub use common::response::{ApiResponse, ErrorResponse};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
