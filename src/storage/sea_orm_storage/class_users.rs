//! 班级成员存储操作

use super::{SeaOrmStorage, map_insert_err};
use crate::entity::user_classes::{ActiveModel, Column, Entity as UserClasses};
use crate::entity::users::Entity as Users;
use crate::errors::{GradebookError, Result};
use crate::models::{
    class_users::{
        entities::{ClassUser, ClassUserRole},
        requests::NewClassUser,
    },
    classes::responses::ClassMember,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

impl SeaOrmStorage {
    /// 添加班级成员
    pub async fn add_class_user_impl(&self, member: NewClassUser) -> Result<ClassUser> {
        let model = ActiveModel {
            user_id: Set(member.user_id),
            class_id: Set(member.class_id),
            role: Set(member.role.to_string()),
            student_id: Set(member.student_id),
            joined_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            map_insert_err(e, "User is already a member of this class", "添加班级成员失败")
        })?;

        Ok(result.into_class_user())
    }

    /// 获取用户在班级中的成员关系
    pub async fn get_class_user_impl(
        &self,
        user_id: i64,
        class_id: i64,
    ) -> Result<Option<ClassUser>> {
        let result = UserClasses::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::ClassId.eq(class_id))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询班级成员失败: {e}")))?;

        Ok(result.map(|m| m.into_class_user()))
    }

    /// 通过学号获取班级成员
    pub async fn get_class_user_by_student_id_impl(
        &self,
        class_id: i64,
        student_id: &str,
    ) -> Result<Option<ClassUser>> {
        let result = UserClasses::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询班级成员失败: {e}")))?;

        Ok(result.map(|m| m.into_class_user()))
    }

    /// 列出班级成员及用户资料
    pub async fn list_class_members_impl(&self, class_id: i64) -> Result<Vec<ClassMember>> {
        let rows = UserClasses::find()
            .filter(Column::ClassId.eq(class_id))
            .order_by_asc(Column::Id)
            .find_also_related(Users)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询班级成员失败: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|(membership, user)| {
                let user = user?;
                let membership = membership.into_class_user();
                Some(ClassMember {
                    user_id: user.id,
                    fullname: user.fullname,
                    email: user.email,
                    img_url: user.img_url,
                    role: membership.role,
                    student_id: membership.student_id,
                })
            })
            .collect())
    }

    /// 列出班级教师的用户 ID
    pub async fn list_class_teacher_ids_impl(&self, class_id: i64) -> Result<Vec<i64>> {
        let ids = UserClasses::find()
            .select_only()
            .column(Column::UserId)
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::Role.eq(ClassUserRole::Teacher.to_string()))
            .order_by_asc(Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询班级教师失败: {e}")))?;

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::testing::{enroll_student, seed_class, seed_user};

    #[tokio::test]
    async fn test_duplicate_membership_is_conflict() {
        let storage = SeaOrmStorage::connect_in_memory().await.unwrap();
        let owner = seed_user(&storage, "t@x.com").await;
        let student = seed_user(&storage, "s@x.com").await;
        let class = seed_class(&storage, owner, "Math").await;

        enroll_student(&storage, student, class.id, "S001").await;
        let err = storage
            .add_class_user_impl(NewClassUser {
                user_id: student,
                class_id: class.id,
                role: ClassUserRole::Teacher,
                student_id: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status(), actix_web::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_members_and_teachers() {
        let storage = SeaOrmStorage::connect_in_memory().await.unwrap();
        let owner = seed_user(&storage, "t@x.com").await;
        let student = seed_user(&storage, "s@x.com").await;
        let class = seed_class(&storage, owner, "Math").await;
        enroll_student(&storage, student, class.id, "S001").await;

        let members = storage.list_class_members_impl(class.id).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].user_id, owner);
        assert_eq!(members[0].role, ClassUserRole::Teacher);
        assert_eq!(members[1].email, "s@x.com");
        assert_eq!(members[1].student_id.as_deref(), Some("S001"));

        assert_eq!(
            storage.list_class_teacher_ids_impl(class.id).await.unwrap(),
            vec![owner]
        );

        let by_code = storage
            .get_class_user_by_student_id_impl(class.id, "S001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_code.user_id, student);
        assert!(
            storage
                .get_class_user_by_student_id_impl(class.id, "S999")
                .await
                .unwrap()
                .is_none()
        );
    }
}
