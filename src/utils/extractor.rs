//! 路径参数提取器
//!
//! 非法 ID 统一返回 400 错误响应，而不是 actix 默认的纯文本 404。

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::errors::GradebookError;

/// 从路径 `{id}` 中提取正整数 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeIDI64(pub i64);

impl SafeIDI64 {
    fn parse(raw: Option<&str>) -> Result<Self, GradebookError> {
        raw.and_then(|s| s.parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(SafeIDI64)
            .ok_or_else(|| GradebookError::bad_request("Invalid id in path"))
    }
}

impl FromRequest for SafeIDI64 {
    type Error = GradebookError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::parse(req.match_info().get("id")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(SafeIDI64::parse(Some("42")).unwrap(), SafeIDI64(42));
        assert!(SafeIDI64::parse(Some("0")).is_err());
        assert!(SafeIDI64::parse(Some("-3")).is_err());
        assert!(SafeIDI64::parse(Some("abc")).is_err());
        assert!(SafeIDI64::parse(None).is_err());
    }
}
