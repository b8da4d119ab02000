use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::auth::{
    entities::OAuthProvider,
    requests::{
        LoginRequest, OAuthCallbackQuery, RegisterRequest, RequestTokenRequest,
        ResetPasswordRequest, SendResetPasswordRequest, VerifyEmailQuery,
    },
};
use crate::services::AuthService;

// 懒加载的全局 AuthService 实例
static AUTH_SERVICE: Lazy<AuthService> = Lazy::new(AuthService::new_lazy);

pub async fn register(
    req: HttpRequest,
    user_data: web::Json<RegisterRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.register(&req, user_data.into_inner()).await
}

pub async fn login(
    req: HttpRequest,
    user_data: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.login(&req, user_data.into_inner()).await
}

pub async fn request_token(body: web::Json<RequestTokenRequest>) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.request_token(body.into_inner()).await
}

pub async fn verify_email(
    req: HttpRequest,
    query: web::Query<VerifyEmailQuery>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.verify_email(&req, query.into_inner()).await
}

pub async fn send_reset_password(
    req: HttpRequest,
    body: web::Json<SendResetPasswordRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE
        .send_reset_password(&req, body.into_inner())
        .await
}

pub async fn reset_password(
    req: HttpRequest,
    body: web::Json<ResetPasswordRequest>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.reset_password(&req, body.into_inner()).await
}

pub async fn facebook_login(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE
        .oauth_redirect(&req, OAuthProvider::Facebook)
        .await
}

pub async fn facebook_callback(
    req: HttpRequest,
    query: web::Query<OAuthCallbackQuery>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE
        .oauth_callback(&req, OAuthProvider::Facebook, query.into_inner())
        .await
}

pub async fn google_login(req: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.oauth_redirect(&req, OAuthProvider::Google).await
}

pub async fn google_callback(
    req: HttpRequest,
    query: web::Query<OAuthCallbackQuery>,
) -> ActixResult<HttpResponse> {
    AUTH_SERVICE
        .oauth_callback(&req, OAuthProvider::Google, query.into_inner())
        .await
}

pub async fn me(request: HttpRequest) -> ActixResult<HttpResponse> {
    AUTH_SERVICE.me(&request).await
}

// 配置路由
pub fn configure_auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/register")
                    .wrap(middlewares::RateLimit::register())
                    .route(web::post().to(register)),
            )
            .service(
                web::resource("/login")
                    .wrap(middlewares::RateLimit::login())
                    .route(web::post().to(login)),
            )
            .service(
                web::resource("/send-reset-password")
                    .wrap(middlewares::RateLimit::reset_password())
                    .route(web::post().to(send_reset_password)),
            )
            .route("/request-token", web::post().to(request_token))
            .route("/reset-password", web::post().to(reset_password))
            .route("/verify", web::get().to(verify_email))
            .route("/facebook", web::get().to(facebook_login))
            .route("/facebook/callback", web::get().to(facebook_callback))
            .route("/google", web::get().to(google_login))
            .route("/google/callback", web::get().to(google_callback))
            .service(
                web::resource("/me")
                    .wrap(middlewares::RequireJWT)
                    .route(web::get().to(me)),
            ),
    );
}
