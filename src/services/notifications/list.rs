use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::NotificationService;
use crate::errors::{GradebookError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, notifications::requests::NotificationListQuery};
use crate::storage::Storage;

pub async fn handle_list(
    service: &NotificationService,
    request: &HttpRequest,
    query: NotificationListQuery,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;
    let response = storage.list_notifications(user.id, query).await?;
    Ok(ApiResponse::success(response, "Successfully").into_response())
}

pub async fn handle_mark_as_read(
    service: &NotificationService,
    request: &HttpRequest,
    notification_id: i64,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;
    mark_as_read(&storage, user.id, notification_id).await?;
    Ok(ApiResponse::success_empty("Notification marked as read").into_response())
}

/// 只有接收者可以标记已读
pub async fn mark_as_read(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    notification_id: i64,
) -> Result<()> {
    let notification = storage
        .get_notification_by_id(notification_id)
        .await?
        .ok_or_else(|| GradebookError::not_found("Notification not found"))?;
    if notification.user_id != user_id {
        return Err(GradebookError::authorization(
            "Cannot modify another user's notification",
        ));
    }

    if !notification.is_read {
        storage.mark_notification_read(notification_id).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::{
        entities::NotificationType, requests::CreateNotificationRequest,
    };
    use crate::services::testing::{create_user, memory_storage};

    #[actix_web::test]
    async fn test_only_recipient_marks_read() {
        let storage = memory_storage().await;
        let owner = create_user(&storage, "a@x.com").await;
        let other = create_user(&storage, "b@x.com").await;
        let notification = storage
            .create_notification(CreateNotificationRequest {
                user_id: owner,
                class_id: None,
                notification_type: NotificationType::System,
                content: "Welcome".to_string(),
                content_url: None,
            })
            .await
            .unwrap();

        let err = mark_as_read(&storage, other, notification.id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E011");

        mark_as_read(&storage, owner, notification.id).await.unwrap();
        let stored = storage
            .get_notification_by_id(notification.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_read);

        let err = mark_as_read(&storage, owner, notification.id + 1)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E012");
    }
}
