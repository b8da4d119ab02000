//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，每个错误携带错误代码、类型名称和 HTTP 状态码。
//! `GradebookError` 实现了 `ResponseError`，服务层直接返回 `Result<T>`，
//! 路由层使用 `?` 即可得到统一的错误响应。

use std::fmt;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::models::ErrorResponse;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - status() 方法 - 返回对应的 HTTP 状态码
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_gradebook_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal, $status:ident)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum GradebookError {
            $($variant(String),)*
        }

        impl GradebookError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(GradebookError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(GradebookError::$variant(_) => $type_name,)*
                }
            }

            /// 获取 HTTP 状态码
            pub fn status(&self) -> StatusCode {
                match self {
                    $(GradebookError::$variant(_) => StatusCode::$status,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(GradebookError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl GradebookError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        GradebookError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_gradebook_errors! {
    Configuration("E001", "Configuration Error", INTERNAL_SERVER_ERROR),
    CacheConnection("E002", "Cache Connection Error", INTERNAL_SERVER_ERROR),
    CachePluginNotFound("E003", "Cache Plugin Not Found", INTERNAL_SERVER_ERROR),
    DatabaseConfig("E004", "Database Configuration Error", INTERNAL_SERVER_ERROR),
    DatabaseConnection("E005", "Database Connection Error", INTERNAL_SERVER_ERROR),
    DatabaseOperation("E006", "Database Operation Error", INTERNAL_SERVER_ERROR),
    Serialization("E007", "Serialization Error", INTERNAL_SERVER_ERROR),
    Validation("E008", "Validation Error", BAD_REQUEST),
    BadRequest("E009", "Bad Request", BAD_REQUEST),
    Authentication("E010", "Authentication Error", UNAUTHORIZED),
    Authorization("E011", "Authorization Error", FORBIDDEN),
    NotFound("E012", "Resource Not Found", NOT_FOUND),
    Conflict("E013", "Conflict", CONFLICT),
    Token("E014", "Token Error", UNAUTHORIZED),
    ExternalService("E015", "External Service Error", BAD_GATEWAY),
    RateLimited("E016", "Too Many Requests", TOO_MANY_REQUESTS),
}

impl GradebookError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为服务端内部错误（不向客户端暴露详情）
    pub fn is_internal(&self) -> bool {
        self.status() == StatusCode::INTERNAL_SERVER_ERROR
    }

    /// 构造错误响应体
    pub fn to_error_response(&self) -> ErrorResponse {
        let message = if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.message().to_string()
        };

        ErrorResponse {
            status_code: self.status().as_u16(),
            message,
            error: self.error_type().to_string(),
            code: self.code().to_string(),
        }
    }
}

impl fmt::Display for GradebookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GradebookError {}

impl ResponseError for GradebookError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_internal() {
            error!("{} [{}]", self.format_simple(), self.code());
        }
        HttpResponse::build(self.status()).json(self.to_error_response())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for GradebookError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                GradebookError::Conflict(detail)
            }
            _ => GradebookError::DatabaseOperation(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for GradebookError {
    fn from(err: serde_json::Error) -> Self {
        GradebookError::Serialization(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for GradebookError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => GradebookError::Token("Token has expired".to_string()),
            _ => GradebookError::Token("Invalid token".to_string()),
        }
    }
}

impl From<reqwest::Error> for GradebookError {
    fn from(err: reqwest::Error) -> Self {
        GradebookError::ExternalService(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GradebookError>;
