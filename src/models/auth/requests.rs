use serde::Deserialize;
use ts_rs::TS;

// 注册请求
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub fullname: String,
}

// 登录请求
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// 使用 refresh token 换取 access token
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct RequestTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct SendResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct ResetPasswordRequest {
    pub user_id: i64,
    pub email: String,
    pub token: String,
    pub new_password: String,
}

// 邮箱验证链接参数（查询字符串，蛇形命名）
#[derive(Debug, Deserialize)]
pub struct VerifyEmailQuery {
    pub user_id: i64,
    pub email: String,
    pub token: String,
}

// OAuth 回调参数
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
