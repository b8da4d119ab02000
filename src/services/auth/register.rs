use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::{AuthService, verify::send_verification_mail};
use crate::errors::{GradebookError, Result};
use crate::models::{
    ApiResponse,
    auth::{AuthResponse, RegisterRequest},
    users::{entities::UserRole, requests::CreateUserRequest},
};
use crate::services::mail::{Mailer, mailer_from_request};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_fullname, validate_password_simple};

pub async fn handle_register(
    service: &AuthService,
    request: &HttpRequest,
    register_request: RegisterRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let mailer = mailer_from_request(request);

    let response = register_user(&storage, &mailer, register_request).await?;
    Ok(ApiResponse::created(response, "Register successfully").into_response())
}

pub async fn register_user(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    register_request: RegisterRequest,
) -> Result<AuthResponse> {
    let email = register_request.email.trim().to_string();
    let fullname = register_request.fullname.trim().to_string();

    validate_email(&email).map_err(GradebookError::validation)?;
    validate_fullname(&fullname).map_err(GradebookError::validation)?;
    validate_password_simple(&register_request.password).map_err(GradebookError::validation)?;

    // 先查重给出业务错误；并发注册由唯一索引兜底（Conflict）
    if storage.get_user_by_email(&email).await?.is_some() {
        return Err(GradebookError::bad_request("Email already registered"));
    }

    let password_hash = hash_password(&register_request.password)?;
    let user = storage
        .create_user(CreateUserRequest {
            email,
            fullname,
            password_hash: Some(password_hash),
            img_url: None,
            facebook_id: None,
            google_id: None,
            role: UserRole::User,
            is_verified: false,
        })
        .await?;

    // 验证邮件发送失败不影响注册结果
    if let Err(e) = send_verification_mail(mailer, &user).await {
        warn!("Failed to send verification mail to user {}: {}", user.id, e);
    }

    let tokens = user.generate_token_pair()?;
    info!("User {} registered", user.id);

    Ok(AuthResponse {
        user_id: user.id,
        email: user.email,
        fullname: user.fullname,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    })
}
