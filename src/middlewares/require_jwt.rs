/*!
 * JWT 认证中间件
 *
 * 验证 `Authorization: Bearer <access token>`，通过后把当前用户放入请求扩展。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::RequireJWT;
 *
 * web::resource("/me")
 *     .wrap(RequireJWT)
 *     .route(web::get().to(me_handler));
 *
 * async fn me_handler(req: HttpRequest) -> ActixResult<HttpResponse> {
 *     let user = RequireJWT::current_user(&req)?;
 *     // ...
 * }
 * ```
 *
 * ## 认证流程
 *
 * 1. 提取并校验 access token（签名、过期时间、token 类型）
 * 2. 以 `user:{token}` 为键查询对象缓存
 * 3. 缓存未命中时从存储中读取用户并写回缓存
 * 4. 任一步失败返回 401
 */

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

/// 根据 access token 解析出当前用户
///
/// 中间件和 WebSocket 握手（token 放在查询参数里）共用。
pub async fn authenticate_access_token(
    token: &str,
    storage: &Arc<dyn Storage>,
    cache: Option<&Arc<dyn ObjectCache>>,
) -> Result<User> {
    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        GradebookError::from(err)
    })?;

    let cache_key = format!("user:{token}");
    if let Some(cache) = cache {
        match cache.get_raw(&cache_key).await {
            CacheResult::Found(json) => match serde_json::from_str::<User>(&json) {
                Ok(user) => return Ok(user),
                Err(_) => {
                    cache.remove(&cache_key).await;
                    info!("Failed to deserialize cached user, entry dropped");
                }
            },
            _ => debug!("User not found in cache for token"),
        }
    }

    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| GradebookError::token("Invalid user ID in token"))?;

    let user = storage
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| GradebookError::authentication("User not found"))?;

    if let Some(cache) = cache
        && let Ok(user_json) = serde_json::to_string(&user)
    {
        // 缓存时间不超过 access token 的有效期
        let config = AppConfig::get();
        let ttl = config
            .cache
            .default_ttl
            .min((config.jwt.access_token_expiry.max(1) * 60) as u64);
        cache.insert_raw(cache_key, user_json, ttl).await;
    }

    Ok(user)
}

async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<User> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| GradebookError::authentication("Missing or invalid Authorization header"))?;

    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| GradebookError::configuration("Storage not found in app data"))?;
    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone());

    authenticate_access_token(token, &storage, cache.as_ref()).await
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<std::result::Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, std::result::Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 预检请求直接放行
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(HttpResponse::NoContent().finish().map_into_right_body()));
            }

            match extract_and_validate_jwt(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(create_error_response(err).map_into_right_body()))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 从请求扩展中提取当前用户
    pub fn extract_user_claims(req: &HttpRequest) -> Option<User> {
        req.extensions().get::<User>().cloned()
    }

    /// 提取当前用户，不存在时返回 401
    pub fn current_user(req: &HttpRequest) -> Result<User> {
        Self::extract_user_claims(req)
            .ok_or_else(|| GradebookError::authentication("Authentication required"))
    }

    pub fn extract_user_id(req: &HttpRequest) -> Option<i64> {
        req.extensions().get::<User>().map(|user| user.id)
    }

    pub fn extract_user_role(req: &HttpRequest) -> Option<UserRole> {
        req.extensions().get::<User>().map(|user| user.role.clone())
    }
}
