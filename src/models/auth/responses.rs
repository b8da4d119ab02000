use serde::Serialize;
use ts_rs::TS;

// 注册/登录响应
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct AuthResponse {
    pub user_id: i64,
    pub email: String,
    pub fullname: String,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct RequestTokenResponse {
    pub access_token: String,
}

/// OAuth 登录结果，随回跳地址交给前端
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: i64,
}
