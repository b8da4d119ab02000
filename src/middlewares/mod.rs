pub mod rate_limit;
pub mod require_class_role;
pub mod require_jwt;
pub mod require_role;

pub use rate_limit::RateLimit;
pub use require_class_role::RequireClassRole;
pub use require_jwt::RequireJWT;
pub use require_role::RequireRole;

use actix_web::{HttpResponse, ResponseError};

use crate::errors::GradebookError;

// 中间件拒绝请求时的统一响应，与处理器返回的错误格式一致
fn create_error_response(err: GradebookError) -> HttpResponse {
    tracing::debug!("Request rejected by middleware: {}", err);
    err.error_response()
}
