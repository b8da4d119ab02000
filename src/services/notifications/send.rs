use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::models::notifications::{
    entities::{Notification, NotificationType},
    requests::CreateNotificationRequest,
};
use crate::services::websocket::ConnectionManager;
use crate::storage::Storage;

/// 保存通知并推送给在线的接收者
pub async fn create_notification_for_one_student(
    storage: &Arc<dyn Storage>,
    req: CreateNotificationRequest,
) -> Result<Notification> {
    let notification = storage.create_notification(req).await?;
    let user_id = notification.user_id;
    if ConnectionManager::get().push_notification(user_id, notification.clone()) {
        debug!("Notification {} pushed to user {}", notification.id, user_id);
    }
    Ok(notification)
}

/// 向多个用户发送同一条通知
///
/// 通知是业务操作的附带结果，单个接收者失败只记录日志。
pub async fn notify_users(
    storage: &Arc<dyn Storage>,
    user_ids: &[i64],
    class_id: i64,
    notification_type: NotificationType,
    content: &str,
    content_url: &str,
) {
    for &user_id in user_ids {
        let req = CreateNotificationRequest {
            user_id,
            class_id: Some(class_id),
            notification_type,
            content: content.to_string(),
            content_url: Some(content_url.to_string()),
        };
        if let Err(e) = create_notification_for_one_student(storage, req).await {
            warn!("Failed to notify user {}: {}", user_id, e);
        }
    }
}
