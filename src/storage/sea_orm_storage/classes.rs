//! 班级存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::classes::{ActiveModel, Entity as Classes};
use crate::entity::user_classes::{
    ActiveModel as UserClassActiveModel, Column as UserClassColumn, Entity as UserClasses,
};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{GradebookError, Result};
use crate::models::{
    class_users::entities::ClassUserRole,
    classes::{entities::Class, requests::CreateClassRequest, responses::UserClassItem},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建班级，创建者作为教师加入（同一事务）
    pub async fn create_class_impl(&self, owner_id: i64, req: CreateClassRequest) -> Result<Class> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        let class = ActiveModel {
            owner_id: Set(owner_id),
            name: Set(req.name),
            title: Set(req.title),
            description: Set(req.description),
            subject: Set(req.subject),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| GradebookError::database_operation(format!("创建班级失败: {e}")))?;

        UserClassActiveModel {
            user_id: Set(owner_id),
            class_id: Set(class.id),
            role: Set(ClassUserRole::Teacher.to_string()),
            student_id: Set(None),
            joined_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| GradebookError::database_operation(format!("登记班级教师失败: {e}")))?;

        txn.commit().await?;
        Ok(class.into_class())
    }

    /// 通过 ID 获取班级
    pub async fn get_class_by_id_impl(&self, class_id: i64) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 列出用户所在的班级，附带创建者姓名和头像
    pub async fn list_user_classes_impl(&self, user_id: i64) -> Result<Vec<UserClassItem>> {
        let rows = UserClasses::find()
            .filter(UserClassColumn::UserId.eq(user_id))
            .order_by_asc(UserClassColumn::Id)
            .find_also_related(Classes)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询用户班级失败: {e}")))?;

        let owner_ids: Vec<i64> = rows
            .iter()
            .filter_map(|(_, class)| class.as_ref().map(|c| c.owner_id))
            .collect();
        let owners: HashMap<i64, (String, Option<String>)> = Users::find()
            .filter(UserColumn::Id.is_in(owner_ids))
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询班级创建者失败: {e}")))?
            .into_iter()
            .map(|u| (u.id, (u.fullname, u.img_url)))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|(membership, class)| {
                let class = class?;
                let (creator, avatar) = owners.get(&class.owner_id).cloned().unwrap_or_default();
                Some(UserClassItem {
                    id: class.id,
                    title: class.title,
                    name: class.name,
                    owner: class.owner_id,
                    creator,
                    avatar,
                    role: membership.into_class_user().role,
                })
            })
            .collect())
    }
}
