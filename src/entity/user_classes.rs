//! 班级成员实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_classes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub class_id: i64,
    pub role: String,
    /// 学生学号，成绩按学号登记
    pub student_id: Option<String>,
    pub joined_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_class_user(self) -> crate::models::class_users::entities::ClassUser {
        use crate::models::class_users::entities::{ClassUser, ClassUserRole};

        ClassUser {
            id: self.id,
            class_id: self.class_id,
            user_id: self.user_id,
            role: self
                .role
                .parse::<ClassUserRole>()
                .unwrap_or(ClassUserRole::Student),
            student_id: self.student_id,
            joined_at: super::to_datetime(self.joined_at),
        }
    }
}
