use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;
use tracing::info;

use super::NotificationService;
use crate::cache::ObjectCache;
use crate::errors::GradebookError;
use crate::middlewares::require_jwt::authenticate_access_token;
use crate::services::websocket::WebSocketService;

/// 浏览器 WebSocket 无法设置请求头，access token 通过查询参数传入
pub async fn handle_connect(
    service: &NotificationService,
    request: &HttpRequest,
    body: web::Payload,
    token: Option<String>,
) -> ActixResult<HttpResponse> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GradebookError::authentication("Missing token"))?;

    let storage = service.get_storage(request)?;
    let cache = request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone());
    let user = authenticate_access_token(&token, &storage, cache.as_ref()).await?;

    let (response, session, stream) = actix_ws::handle(request, body)?;
    info!("WebSocket handshake accepted for user {}", user.id);
    actix_web::rt::spawn(WebSocketService::handle_connection(user.id, session, stream));

    Ok(response)
}
