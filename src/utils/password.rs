use crate::config::AppConfig;
use crate::errors::GradebookError;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

/// 哈希密码
pub fn hash_password(password: &str) -> Result<String, GradebookError> {
    let config = AppConfig::get();
    let params = Params::new(
        config.argon2.memory_cost,
        config.argon2.time_cost,
        config.argon2.parallelism,
        None,
    )
    .map_err(|e| GradebookError::configuration(format!("Argon2 参数错误: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| GradebookError::validation(format!("密码哈希失败: {e}")))?;
    Ok(hash.to_string())
}

/// 验证密码
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// 密码哈希指纹
///
/// 取 PHC 字符串中的盐值，每次重新哈希都会变化。OAuth 账号没有密码，返回空串。
pub fn password_fingerprint(hash: Option<&str>) -> String {
    hash.and_then(|h| PasswordHash::new(h).ok())
        .and_then(|p| p.salt.map(|s| s.as_str().to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("SecurePass123").unwrap();
        assert!(verify_password("SecurePass123", &hash));
        assert!(!verify_password("WrongPass123", &hash));
        assert!(!verify_password("SecurePass123", "not-a-phc-string"));
    }

    #[test]
    fn test_fingerprint_changes_after_rehash() {
        let first = hash_password("SecurePass123").unwrap();
        let second = hash_password("SecurePass123").unwrap();
        let fp1 = password_fingerprint(Some(&first));
        assert!(!fp1.is_empty());
        assert_eq!(fp1, password_fingerprint(Some(&first)));
        assert_ne!(fp1, password_fingerprint(Some(&second)));
        assert_eq!(password_fingerprint(None), "");
    }
}
