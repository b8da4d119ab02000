use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::errors::Result;
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    auth::{requests::RequestTokenRequest, responses::RequestTokenResponse},
};
use crate::utils::jwt::JwtUtils;

pub async fn handle_request_token(body: RequestTokenRequest) -> ActixResult<HttpResponse> {
    let response = request_access_token(&body.refresh_token)?;
    Ok(ApiResponse::success(response, "Request token successfully").into_response())
}

pub fn request_access_token(refresh_token: &str) -> Result<RequestTokenResponse> {
    let access_token = JwtUtils::refresh_access_token(refresh_token).map_err(|e| {
        tracing::info!("Refresh token rejected: {}", e);
        e
    })?;
    Ok(RequestTokenResponse { access_token })
}

pub async fn handle_me(request: &HttpRequest) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    Ok(ApiResponse::success(user, "Successfully").into_response())
}
