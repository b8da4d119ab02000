use serde::Deserialize;
use ts_rs::TS;

use super::entities::NotificationType;
use crate::models::PaginationQuery;

// 创建通知（服务内部使用）
#[derive(Debug, Clone)]
pub struct CreateNotificationRequest {
    pub user_id: i64,
    pub class_id: Option<i64>,
    pub notification_type: NotificationType,
    pub content: String,
    pub content_url: Option<String>,
}

// 通知列表查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct NotificationListQuery {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
}

// WebSocket 握手参数
#[derive(Debug, Clone, Deserialize)]
pub struct WsTokenQuery {
    pub token: Option<String>,
}
