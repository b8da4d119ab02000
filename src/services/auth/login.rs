use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AuthService;
use crate::errors::{GradebookError, Result};
use crate::models::{
    ApiResponse,
    auth::{AuthResponse, LoginRequest},
};
use crate::storage::Storage;
use crate::utils::password::verify_password;

const INVALID_CREDENTIALS: &str = "Email or password is incorrect";

pub async fn handle_login(
    service: &AuthService,
    request: &HttpRequest,
    login_request: LoginRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let response = authenticate(&storage, login_request).await?;
    Ok(ApiResponse::success(response, "Login successfully").into_response())
}

pub async fn authenticate(
    storage: &Arc<dyn Storage>,
    login_request: LoginRequest,
) -> Result<AuthResponse> {
    // 1. 根据邮箱获取用户
    let user = storage
        .get_user_by_email(login_request.email.trim())
        .await?
        .ok_or_else(|| GradebookError::authentication(INVALID_CREDENTIALS))?;

    // 2. 验证密码，第三方登录注册的账号没有密码
    let matched = user
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&login_request.password, hash));
    if !matched {
        return Err(GradebookError::authentication(INVALID_CREDENTIALS));
    }

    // 3. 生成令牌对
    let tokens = user.generate_token_pair()?;
    info!("User {} logged in successfully", user.id);

    Ok(AuthResponse {
        user_id: user.id,
        email: user.email,
        fullname: user.fullname,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    })
}
