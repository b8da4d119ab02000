use crate::config::AppConfig;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Subject (user ID)
    pub role: String,       // 用户角色
    pub token_type: String, // token类型: "access" 或 "refresh"
    pub exp: usize,         // Expiration time (时间戳)
    pub iat: usize,         // Issued at (签发时间)
}

/// 一次性用途的签名令牌：密码重置、邮箱验证、班级邀请
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Reset,
    Verify,
    Invite,
}

// 用途令牌的 Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurposeClaims {
    /// 用户 ID（邀请令牌为班级 ID）
    pub sub: String,
    pub purpose: TokenPurpose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// 密码哈希指纹，重置成功后旧令牌随之失效
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

// Token 响应结构体
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct JwtUtils;

impl JwtUtils {
    // 获取 JWT 密钥
    fn get_secret() -> String {
        AppConfig::get().jwt.secret.clone()
    }

    fn encode_claims<T: Serialize>(claims: &T) -> Result<String, jsonwebtoken::errors::Error> {
        let secret = Self::get_secret();
        let encoding_key = EncodingKey::from_secret(secret.as_ref());
        encode(&Header::default(), claims, &encoding_key)
    }

    fn decode_claims<T: for<'de> Deserialize<'de>>(
        token: &str,
    ) -> Result<T, jsonwebtoken::errors::Error> {
        let secret = Self::get_secret();
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let validation = Validation::default();

        decode::<T>(token, &decoding_key, &validation).map(|token_data| token_data.claims)
    }

    // 生成 Access Token
    pub fn generate_access_token(
        user_id: i64,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        Self::generate_token_with_expiry(
            user_id,
            role,
            "access",
            chrono::Duration::minutes(config.jwt.access_token_expiry),
        )
    }

    // 生成 Refresh Token
    pub fn generate_refresh_token(
        user_id: i64,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let config = AppConfig::get();
        Self::generate_token_with_expiry(
            user_id,
            role,
            "refresh",
            chrono::Duration::days(config.jwt.refresh_token_expiry),
        )
    }

    // 生成带自定义过期时间的 Token
    pub fn generate_token_with_expiry(
        user_id: i64,
        role: &str,
        token_type: &str,
        expiry_duration: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let expiration = now + expiry_duration;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            token_type: token_type.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Self::encode_claims(&claims)
    }

    // 生成完整的 Token 响应（包含 access 和 refresh token）
    pub fn generate_token_pair(
        user_id: i64,
        role: &str,
    ) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        let access_token = Self::generate_access_token(user_id, role)?;
        let refresh_token = Self::generate_refresh_token(user_id, role)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    // 验证 JWT token
    pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::decode_claims::<Claims>(token)
    }

    // 验证 token 是否为指定类型
    pub fn verify_token_type(
        token: &str,
        expected_type: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claims = Self::verify_token(token)?;
        if claims.token_type != expected_type {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }
        Ok(claims)
    }

    // 验证 Access Token
    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_token_type(token, "access")
    }

    // 验证 Refresh Token
    pub fn verify_refresh_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_token_type(token, "refresh")
    }

    // 使用 Refresh Token 生成新的 Access Token
    pub fn refresh_access_token(
        refresh_token: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Self::verify_refresh_token(refresh_token)?;
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| jsonwebtoken::errors::ErrorKind::InvalidToken)?;
        Self::generate_access_token(user_id, &claims.role)
    }

    /// 生成用途令牌
    pub fn generate_purpose_token(
        subject: i64,
        purpose: TokenPurpose,
        email: Option<&str>,
        fingerprint: Option<&str>,
        expiry_duration: chrono::Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = PurposeClaims {
            sub: subject.to_string(),
            purpose,
            email: email.map(str::to_string),
            fingerprint: fingerprint.map(str::to_string),
            exp: (now + expiry_duration).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        Self::encode_claims(&claims)
    }

    /// 验证用途令牌，用途不符视为无效
    pub fn verify_purpose_token(
        token: &str,
        expected: TokenPurpose,
    ) -> Result<PurposeClaims, jsonwebtoken::errors::Error> {
        let claims = Self::decode_claims::<PurposeClaims>(token)?;
        if claims.purpose != expected {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_and_refresh_types_are_not_interchangeable() {
        let pair = JwtUtils::generate_token_pair(7, "user").unwrap();
        let claims = JwtUtils::verify_access_token(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "7");
        assert!(JwtUtils::verify_access_token(&pair.refresh_token).is_err());
        assert!(JwtUtils::verify_refresh_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_refresh_access_token() {
        let refresh = JwtUtils::generate_refresh_token(3, "admin").unwrap();
        let access = JwtUtils::refresh_access_token(&refresh).unwrap();
        let claims = JwtUtils::verify_access_token(&access).unwrap();
        assert_eq!(claims.sub, "3");
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn test_purpose_token_rejects_other_purpose() {
        let token = JwtUtils::generate_purpose_token(
            12,
            TokenPurpose::Invite,
            None,
            None,
            chrono::Duration::days(1),
        )
        .unwrap();

        let claims = JwtUtils::verify_purpose_token(&token, TokenPurpose::Invite).unwrap();
        assert_eq!(claims.sub, "12");
        assert!(JwtUtils::verify_purpose_token(&token, TokenPurpose::Reset).is_err());
        // 用途令牌不能当作 access token 使用
        assert!(JwtUtils::verify_access_token(&token).is_err());
    }

    #[test]
    fn test_expired_purpose_token() {
        let token = JwtUtils::generate_purpose_token(
            1,
            TokenPurpose::Verify,
            Some("a@x.com"),
            None,
            chrono::Duration::hours(-2),
        )
        .unwrap();
        let err = JwtUtils::verify_purpose_token(&token, TokenPurpose::Verify).unwrap_err();
        assert_eq!(
            err.kind(),
            &jsonwebtoken::errors::ErrorKind::ExpiredSignature
        );
    }
}
