use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    class_users::{entities::ClassUserRole, requests::NewClassUser},
    classes::{
        requests::{InviteRequest, VerifyInviteRequest},
        responses::{InviteLinkResponse, VerifyInviteResponse},
    },
};
use crate::services::auth::client_link;
use crate::storage::Storage;
use crate::utils::jwt::{JwtUtils, TokenPurpose};

const INVALID_INVITE: &str = "Invite link is invalid or expired";

pub async fn handle_get_invite_link(
    service: &ClassService,
    request: &HttpRequest,
    body: InviteRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;
    let link = get_invite_link(&storage, body.class_id, user.id).await?;
    Ok(ApiResponse::success(link, "Successfully").into_response())
}

pub async fn handle_verify_invite(
    service: &ClassService,
    request: &HttpRequest,
    body: VerifyInviteRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;
    let result = verify_invite_and_add(&storage, user.id, body).await?;
    Ok(ApiResponse::success(result, "Successfully").into_response())
}

/// 生成班级邀请链接，只有班级成员可以分享
pub async fn get_invite_link(
    storage: &Arc<dyn Storage>,
    class_id: i64,
    user_id: i64,
) -> Result<InviteLinkResponse> {
    if storage.get_class_by_id(class_id).await?.is_none() {
        return Err(GradebookError::not_found("Class not found"));
    }
    if storage.get_class_user(user_id, class_id).await?.is_none() {
        return Err(GradebookError::authorization("No permission for this class"));
    }

    let token = JwtUtils::generate_purpose_token(
        class_id,
        TokenPurpose::Invite,
        None,
        None,
        chrono::Duration::days(AppConfig::get().jwt.invite_token_expiry),
    )?;
    let link = client_link(
        "/class/join",
        &[("class_id", class_id.to_string()), ("token", token.clone())],
    )?;

    Ok(InviteLinkResponse { link, token })
}

/// 校验邀请令牌，把当前用户以学生身份加入班级
pub async fn verify_invite_and_add(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    body: VerifyInviteRequest,
) -> Result<VerifyInviteResponse> {
    let claims = JwtUtils::verify_purpose_token(&body.token, TokenPurpose::Invite)
        .map_err(|_| GradebookError::bad_request(INVALID_INVITE))?;
    if claims.sub != body.class_id.to_string() {
        return Err(GradebookError::bad_request(INVALID_INVITE));
    }
    if storage.get_class_by_id(body.class_id).await?.is_none() {
        return Err(GradebookError::not_found("Class not found"));
    }

    storage
        .add_class_user(NewClassUser {
            user_id,
            class_id: body.class_id,
            role: ClassUserRole::Student,
            // 学号只能由教师绑定，避免冒领他人成绩
            student_id: None,
        })
        .await?;
    info!("User {} joined class {} by invite", user_id, body.class_id);

    Ok(VerifyInviteResponse { is_success: true })
}
