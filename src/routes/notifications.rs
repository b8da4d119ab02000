use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::notifications::requests::{NotificationListQuery, WsTokenQuery};
use crate::services::NotificationService;
use crate::utils::SafeIDI64;

static NOTIFICATION_SERVICE: Lazy<NotificationService> =
    Lazy::new(NotificationService::new_lazy);

pub async fn list_notifications(
    req: HttpRequest,
    query: web::Query<NotificationListQuery>,
) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE
        .list_notifications(&req, query.into_inner())
        .await
}

pub async fn mark_as_read(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE.mark_as_read(&req, id.0).await
}

pub async fn connect(
    req: HttpRequest,
    body: web::Payload,
    query: web::Query<WsTokenQuery>,
) -> ActixResult<HttpResponse> {
    NOTIFICATION_SERVICE
        .connect(&req, body, query.into_inner().token)
        .await
}

// 配置路由
pub fn configure_notification_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notification")
            // WebSocket 握手在服务内用查询参数中的 token 认证
            .route("/ws", web::get().to(connect))
            .service(
                web::resource("")
                    .wrap(middlewares::RequireJWT)
                    .route(web::get().to(list_notifications)),
            )
            .service(
                web::resource("/{id}/read")
                    .wrap(middlewares::RequireJWT)
                    .route(web::put().to(mark_as_read)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::{
        entities::NotificationType, requests::CreateNotificationRequest,
    };
    use crate::routes::testing::{bearer, storage_data};
    use crate::services::testing::{create_user, memory_storage};
    use actix_web::{App, http::StatusCode, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_list_and_mark_read() {
        let storage = memory_storage().await;
        let user = create_user(&storage, "n@x.com").await;
        let other = create_user(&storage, "m@x.com").await;
        let notification = storage
            .create_notification(CreateNotificationRequest {
                user_id: user,
                class_id: None,
                notification_type: NotificationType::System,
                content: "Grades are out".to_string(),
                content_url: None,
            })
            .await
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(storage_data(&storage))
                .configure(configure_notification_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/notification?page=1&size=10")
            .insert_header(bearer(user))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let json: Value = test::read_body_json(res).await;
        assert_eq!(json["data"]["items"][0]["content"], "Grades are out");
        assert_eq!(json["data"]["pagination"]["total"], 1);

        let uri = format!("/notification/{}/read", notification.id);
        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer(other))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer(user))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let stored = storage
            .get_notification_by_id(notification.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_read);

        let req = test::TestRequest::put()
            .uri("/notification/abc/read")
            .insert_header(bearer(user))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_ws_requires_token() {
        let storage = memory_storage().await;
        let app = test::init_service(
            App::new()
                .app_data(storage_data(&storage))
                .configure(configure_notification_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/notification/ws").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
