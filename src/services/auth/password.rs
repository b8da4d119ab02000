use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AuthService, client_link};
use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use crate::models::{
    ApiResponse,
    auth::requests::{ResetPasswordRequest, SendResetPasswordRequest},
};
use crate::services::mail::{Mailer, mailer_from_request, reset_password_mail};
use crate::storage::Storage;
use crate::utils::jwt::{JwtUtils, TokenPurpose};
use crate::utils::password::{hash_password, password_fingerprint};
use crate::utils::validate::validate_password_simple;

const INVALID_RESET_LINK: &str = "Reset password link is invalid or expired";

pub async fn handle_send_reset_password(
    service: &AuthService,
    request: &HttpRequest,
    body: SendResetPasswordRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let mailer = mailer_from_request(request);
    send_reset_password(&storage, &mailer, body.email.trim()).await?;
    Ok(ApiResponse::success_empty("Send reset password email successfully").into_response())
}

pub async fn handle_reset_password(
    service: &AuthService,
    request: &HttpRequest,
    body: ResetPasswordRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    reset_password(&storage, body).await?;
    Ok(ApiResponse::success_empty("Reset password successfully").into_response())
}

/// 发送重置密码邮件
///
/// 令牌绑定用户 ID、邮箱和当前密码哈希的指纹，密码一旦修改旧链接即失效。
pub async fn send_reset_password(
    storage: &Arc<dyn Storage>,
    mailer: &Arc<dyn Mailer>,
    email: &str,
) -> Result<()> {
    let user = storage
        .get_user_by_email(email)
        .await?
        .ok_or_else(|| GradebookError::not_found("User not found"))?;

    let fingerprint = password_fingerprint(user.password_hash.as_deref());
    let token = JwtUtils::generate_purpose_token(
        user.id,
        TokenPurpose::Reset,
        Some(&user.email),
        Some(&fingerprint),
        chrono::Duration::minutes(AppConfig::get().jwt.reset_token_expiry),
    )?;
    let link = client_link(
        "/reset-password",
        &[
            ("user_id", user.id.to_string()),
            ("email", user.email.clone()),
            ("token", token),
        ],
    )?;

    mailer
        .send(reset_password_mail(&user.email, &user.fullname, &link))
        .await?;
    info!("Reset password mail sent to user {}", user.id);
    Ok(())
}

pub async fn reset_password(storage: &Arc<dyn Storage>, body: ResetPasswordRequest) -> Result<()> {
    let claims = JwtUtils::verify_purpose_token(&body.token, TokenPurpose::Reset)
        .map_err(|_| GradebookError::bad_request(INVALID_RESET_LINK))?;
    if claims.sub != body.user_id.to_string() || claims.email.as_deref() != Some(&body.email) {
        return Err(GradebookError::bad_request(INVALID_RESET_LINK));
    }

    let user = storage
        .get_user_by_id(body.user_id)
        .await?
        .filter(|user| user.email == body.email)
        .ok_or_else(|| GradebookError::bad_request(INVALID_RESET_LINK))?;

    // 密码已被修改过，令牌作废
    let fingerprint = password_fingerprint(user.password_hash.as_deref());
    if claims.fingerprint.as_deref() != Some(fingerprint.as_str()) {
        return Err(GradebookError::bad_request(INVALID_RESET_LINK));
    }

    validate_password_simple(&body.new_password).map_err(GradebookError::validation)?;
    let password_hash = hash_password(&body.new_password)?;
    if !storage.update_user_password(user.id, &password_hash).await? {
        return Err(GradebookError::not_found("User not found"));
    }

    info!("User {} reset password", user.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::LoginRequest;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use crate::services::auth::login::authenticate;
    use crate::services::mail::{RecordingMailer, query_param};
    use crate::services::testing::memory_storage;

    async fn seed(storage: &Arc<dyn Storage>) -> i64 {
        storage
            .create_user(CreateUserRequest {
                email: "r@x.com".to_string(),
                fullname: "Ray".to_string(),
                password_hash: Some(hash_password("OldSecret1x").unwrap()),
                img_url: None,
                facebook_id: None,
                google_id: None,
                role: UserRole::User,
                is_verified: true,
            })
            .await
            .unwrap()
            .id
    }

    fn reset_request(body: &str, new_password: &str) -> ResetPasswordRequest {
        ResetPasswordRequest {
            user_id: query_param(body, "user_id").unwrap().parse().unwrap(),
            email: query_param(body, "email").unwrap(),
            token: query_param(body, "token").unwrap(),
            new_password: new_password.to_string(),
        }
    }

    #[actix_web::test]
    async fn test_reset_link_works_once() {
        let storage = memory_storage().await;
        seed(&storage).await;
        let recorder = Arc::new(RecordingMailer::default());
        let mailer: Arc<dyn Mailer> = recorder.clone();

        send_reset_password(&storage, &mailer, "r@x.com").await.unwrap();
        let body = recorder.last().unwrap().body;

        reset_password(&storage, reset_request(&body, "NewSecret2y"))
            .await
            .unwrap();
        let login = LoginRequest {
            email: "r@x.com".to_string(),
            password: "NewSecret2y".to_string(),
        };
        assert!(authenticate(&storage, login).await.is_ok());

        // 同一链接第二次使用
        let err = reset_password(&storage, reset_request(&body, "Third3Secret"))
            .await
            .unwrap_err();
        assert_eq!(err, GradebookError::bad_request(INVALID_RESET_LINK));
    }

    #[actix_web::test]
    async fn test_unknown_email_is_not_found() {
        let storage = memory_storage().await;
        let mailer: Arc<dyn Mailer> = Arc::new(RecordingMailer::default());
        let err = send_reset_password(&storage, &mailer, "ghost@x.com")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E012");
    }

    #[actix_web::test]
    async fn test_token_for_other_user_rejected() {
        let storage = memory_storage().await;
        let user_id = seed(&storage).await;
        let token = JwtUtils::generate_purpose_token(
            user_id + 1,
            TokenPurpose::Reset,
            Some("r@x.com"),
            Some(""),
            chrono::Duration::minutes(5),
        )
        .unwrap();

        let err = reset_password(
            &storage,
            ResetPasswordRequest {
                user_id,
                email: "r@x.com".to_string(),
                token,
                new_password: "NewSecret2y".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err, GradebookError::bad_request(INVALID_RESET_LINK));
    }
}
