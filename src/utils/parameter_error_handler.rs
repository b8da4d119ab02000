use actix_web::{Error, HttpRequest, error::JsonPayloadError, error::QueryPayloadError};
use tracing::debug;

use crate::errors::GradebookError;

/// JSON 请求体解析失败时返回统一的 400 错误
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    debug!("JSON payload error on {}: {}", req.path(), err);
    let message = match &err {
        JsonPayloadError::ContentType => "Content type must be application/json".to_string(),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body is too large".to_string()
        }
        JsonPayloadError::Deserialize(e) => format!("Invalid request body: {e}"),
        _ => "Invalid request body".to_string(),
    };
    GradebookError::bad_request(message).into()
}

/// 查询参数解析失败时返回统一的 400 错误
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> Error {
    debug!("Query error on {}: {}", req.path(), err);
    let message = match &err {
        QueryPayloadError::Deserialize(e) => format!("Invalid query parameters: {e}"),
        _ => "Invalid query parameters".to_string(),
    };
    GradebookError::bad_request(message).into()
}
