pub mod login;
pub mod oauth;
pub mod password;
pub mod register;
pub mod token;
pub mod verify;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use crate::models::auth::{
    entities::OAuthProvider,
    requests::{
        LoginRequest, OAuthCallbackQuery, RegisterRequest, RequestTokenRequest,
        ResetPasswordRequest, SendResetPasswordRequest, VerifyEmailQuery,
    },
};
use crate::storage::Storage;

pub struct AuthService {
    storage: Option<Arc<dyn Storage>>,
}

impl AuthService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 用户注册
    pub async fn register(
        &self,
        request: &HttpRequest,
        register_request: RegisterRequest,
    ) -> ActixResult<HttpResponse> {
        register::handle_register(self, request, register_request).await
    }

    // 登录验证
    pub async fn login(
        &self,
        request: &HttpRequest,
        login_request: LoginRequest,
    ) -> ActixResult<HttpResponse> {
        login::handle_login(self, request, login_request).await
    }

    // 使用 refresh token 换取 access token
    pub async fn request_token(&self, body: RequestTokenRequest) -> ActixResult<HttpResponse> {
        token::handle_request_token(body).await
    }

    // 当前用户
    pub async fn me(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        token::handle_me(request).await
    }

    pub async fn send_reset_password(
        &self,
        request: &HttpRequest,
        body: SendResetPasswordRequest,
    ) -> ActixResult<HttpResponse> {
        password::handle_send_reset_password(self, request, body).await
    }

    pub async fn reset_password(
        &self,
        request: &HttpRequest,
        body: ResetPasswordRequest,
    ) -> ActixResult<HttpResponse> {
        password::handle_reset_password(self, request, body).await
    }

    pub async fn verify_email(
        &self,
        request: &HttpRequest,
        query: VerifyEmailQuery,
    ) -> ActixResult<HttpResponse> {
        verify::handle_verify_email(self, request, query).await
    }

    // 跳转到第三方授权页
    pub async fn oauth_redirect(
        &self,
        request: &HttpRequest,
        provider: OAuthProvider,
    ) -> ActixResult<HttpResponse> {
        oauth::handle_redirect(self, request, provider).await
    }

    // 第三方授权回调
    pub async fn oauth_callback(
        &self,
        request: &HttpRequest,
        provider: OAuthProvider,
        query: OAuthCallbackQuery,
    ) -> ActixResult<HttpResponse> {
        oauth::handle_callback(self, request, provider, query).await
    }
}

/// 把前端路径和查询参数拼成完整链接
pub(crate) fn client_link(path: &str, params: &[(&str, String)]) -> Result<String> {
    let base = format!("{}{}", AppConfig::get().client_url(), path);
    reqwest::Url::parse_with_params(&base, params)
        .map(|url| url.to_string())
        .map_err(|e| GradebookError::configuration(format!("Invalid client url {base}: {e}")))
}
