use super::{SeaOrmStorage, map_insert_err};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{GradebookError, Result};
use crate::models::{
    auth::entities::OAuthProvider,
    users::{entities::User, requests::CreateUserRequest},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, sea_query::Expr};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            email: Set(req.email),
            fullname: Set(req.fullname),
            password_hash: Set(req.password_hash),
            img_url: Set(req.img_url),
            facebook_id: Set(req.facebook_id),
            google_id: Set(req.google_id),
            role: Set(req.role.to_string()),
            is_verified: Set(req.is_verified),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_insert_err(e, "Email already registered", "创建用户失败"))?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过第三方账号 ID 获取用户
    pub async fn get_user_by_provider_id_impl(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>> {
        let column = match provider {
            OAuthProvider::Facebook => Column::FacebookId,
            OAuthProvider::Google => Column::GoogleId,
        };

        let result = Users::find()
            .filter(column.eq(provider_id))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 更新密码哈希
    pub async fn update_user_password_impl(&self, id: i64, password_hash: &str) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::PasswordHash, Expr::value(password_hash))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("更新密码失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 标记邮箱已验证
    pub async fn mark_user_verified_impl(&self, id: i64) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(Column::IsVerified, Expr::value(true))
            .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now().timestamp()))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("更新验证状态失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 绑定第三方账号
    ///
    /// 第三方已经验证过邮箱，绑定后账号视为已验证。
    pub async fn link_oauth_account_impl(
        &self,
        id: i64,
        provider: OAuthProvider,
        provider_id: &str,
        img_url: Option<String>,
    ) -> Result<Option<User>> {
        let Some(existing) = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询用户失败: {e}")))?
        else {
            return Ok(None);
        };

        let keep_img = existing.img_url.is_some();
        let mut model: ActiveModel = existing.into();
        match provider {
            OAuthProvider::Facebook => model.facebook_id = Set(Some(provider_id.to_string())),
            OAuthProvider::Google => model.google_id = Set(Some(provider_id.to_string())),
        }
        if !keep_img && img_url.is_some() {
            model.img_url = Set(img_url);
        }
        model.is_verified = Set(true);
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model.update(&self.db).await.map_err(|e| {
            map_insert_err(
                e,
                "This account is already linked to another user",
                "绑定第三方账号失败",
            )
        })?;

        Ok(Some(result.into_user()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;

    fn new_user(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            fullname: "Test User".to_string(),
            password_hash: Some("hash".to_string()),
            img_url: None,
            facebook_id: None,
            google_id: None,
            role: UserRole::User,
            is_verified: false,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let storage = SeaOrmStorage::connect_in_memory().await.unwrap();
        storage.create_user_impl(new_user("a@x.com")).await.unwrap();
        let err = storage
            .create_user_impl(new_user("a@x.com"))
            .await
            .unwrap_err();
        assert_eq!(err, GradebookError::conflict("Email already registered"));
    }

    #[tokio::test]
    async fn test_link_oauth_account() {
        let storage = SeaOrmStorage::connect_in_memory().await.unwrap();
        let user = storage.create_user_impl(new_user("b@x.com")).await.unwrap();
        assert!(!user.is_verified);

        let linked = storage
            .link_oauth_account_impl(
                user.id,
                OAuthProvider::Facebook,
                "fb-123",
                Some("https://img/1.png".to_string()),
            )
            .await
            .unwrap()
            .unwrap();
        assert!(linked.is_verified);
        assert_eq!(linked.facebook_id.as_deref(), Some("fb-123"));
        assert_eq!(linked.img_url.as_deref(), Some("https://img/1.png"));

        let found = storage
            .get_user_by_provider_id_impl(OAuthProvider::Facebook, "fb-123")
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(
            storage
                .get_user_by_provider_id_impl(OAuthProvider::Google, "fb-123")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_update_password_and_verify() {
        let storage = SeaOrmStorage::connect_in_memory().await.unwrap();
        let user = storage.create_user_impl(new_user("c@x.com")).await.unwrap();

        assert!(storage.update_user_password_impl(user.id, "new-hash").await.unwrap());
        assert!(storage.mark_user_verified_impl(user.id).await.unwrap());
        assert!(!storage.mark_user_verified_impl(9999).await.unwrap());

        let user = storage.get_user_by_id_impl(user.id).await.unwrap().unwrap();
        assert_eq!(user.password_hash.as_deref(), Some("new-hash"));
        assert!(user.is_verified);
    }
}
