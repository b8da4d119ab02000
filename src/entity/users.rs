//! 用户实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub fullname: String,
    pub password_hash: Option<String>,
    pub img_url: Option<String>,
    #[sea_orm(unique)]
    pub facebook_id: Option<String>,
    #[sea_orm(unique)]
    pub google_id: Option<String>,
    pub role: String,
    pub is_verified: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_classes::Entity")]
    UserClasses,
    #[sea_orm(has_many = "super::comment_reviews::Entity")]
    CommentReviews,
}

impl Related<super::user_classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserClasses.def()
    }
}

impl Related<super::comment_reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CommentReviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_user(self) -> crate::models::users::entities::User {
        use crate::models::users::entities::{User, UserRole};

        User {
            id: self.id,
            email: self.email,
            fullname: self.fullname,
            password_hash: self.password_hash,
            img_url: self.img_url,
            facebook_id: self.facebook_id,
            google_id: self.google_id,
            role: self.role.parse::<UserRole>().unwrap_or(UserRole::User),
            is_verified: self.is_verified,
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
