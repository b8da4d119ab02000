use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AuthService, client_link};
use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use crate::models::{ApiResponse, auth::requests::VerifyEmailQuery, users::entities::User};
use crate::services::mail::{Mailer, verification_mail};
use crate::storage::Storage;
use crate::utils::jwt::{JwtUtils, TokenPurpose};

const VERIFY_FAIL: &str = "Verify fail";

/// 生成验证链接并发送邮件
pub async fn send_verification_mail(mailer: &Arc<dyn Mailer>, user: &User) -> Result<()> {
    let expiry = chrono::Duration::hours(AppConfig::get().jwt.verify_token_expiry);
    let token = JwtUtils::generate_purpose_token(
        user.id,
        TokenPurpose::Verify,
        Some(&user.email),
        None,
        expiry,
    )?;
    let link = client_link(
        "/verify",
        &[
            ("user_id", user.id.to_string()),
            ("email", user.email.clone()),
            ("token", token),
        ],
    )?;

    mailer
        .send(verification_mail(&user.email, &user.fullname, &link))
        .await
}

pub async fn handle_verify_email(
    service: &AuthService,
    request: &HttpRequest,
    query: VerifyEmailQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    verify_email(&storage, query).await?;
    Ok(ApiResponse::success_empty("Verify success").into_response())
}

pub async fn verify_email(storage: &Arc<dyn Storage>, query: VerifyEmailQuery) -> Result<()> {
    let claims = JwtUtils::verify_purpose_token(&query.token, TokenPurpose::Verify)
        .map_err(|_| GradebookError::bad_request(VERIFY_FAIL))?;
    if claims.sub != query.user_id.to_string() || claims.email.as_deref() != Some(&query.email) {
        return Err(GradebookError::bad_request(VERIFY_FAIL));
    }

    let user = storage
        .get_user_by_id(query.user_id)
        .await?
        .filter(|user| user.email == query.email)
        .ok_or_else(|| GradebookError::bad_request(VERIFY_FAIL))?;

    if !user.is_verified {
        storage.mark_user_verified(user.id).await?;
        info!("User {} verified email", user.id);
    }
    Ok(())
}
