use serde::{Deserialize, Serialize};

/// 支持的第三方登录提供方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthProvider {
    Facebook,
    Google,
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OAuthProvider::Facebook => write!(f, "facebook"),
            OAuthProvider::Google => write!(f, "google"),
        }
    }
}

impl std::str::FromStr for OAuthProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facebook" => Ok(OAuthProvider::Facebook),
            "google" => Ok(OAuthProvider::Google),
            _ => Err(format!("Unsupported OAuth provider: {s}")),
        }
    }
}

/// 第三方返回的用户资料
#[derive(Debug, Clone, PartialEq)]
pub struct OAuthProfile {
    /// Facebook 用户 ID 或 Google `sub`
    pub provider_id: String,
    pub email: Option<String>,
    pub fullname: String,
    pub img_url: Option<String>,
}
