use super::entities::UserRole;

// 创建用户（注册与 OAuth 首次登录共用，存储层使用）
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub email: String,
    pub fullname: String,
    /// 已哈希的密码
    pub password_hash: Option<String>,
    pub img_url: Option<String>,
    pub facebook_id: Option<String>,
    pub google_id: Option<String>,
    pub role: UserRole,
    pub is_verified: bool,
}
