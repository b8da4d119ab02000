//! 成绩存储操作

use super::{SeaOrmStorage, map_insert_err};
use crate::entity::grade_compositions::{
    ActiveModel as GradeActiveModel, Column as GradeColumn, Entity as GradeCompositions,
};
use crate::entity::review_compositions::{
    ActiveModel as ReviewActiveModel, Column as ReviewColumn, Entity as ReviewCompositions,
};
use crate::entity::student_compositions::{ActiveModel, Column, Entity as StudentCompositions};
use crate::errors::{GradebookError, Result};
use crate::models::{
    grades::{
        entities::{GradeComposition, StudentComposition},
        requests::CreateGradeCompositionRequest,
    },
    reviews::{entities::ReviewStatus, responses::FinalizeResponse},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};

const STUDENT_GRADE_EXISTS: &str = "Student grade is being updated concurrently, please retry";

async fn insert_student_grade<C: ConnectionTrait>(
    conn: &C,
    class_id: i64,
    grade_id: i64,
    student_id: &str,
    grade: f64,
    now: i64,
) -> std::result::Result<crate::entity::student_compositions::Model, DbErr> {
    ActiveModel {
        class_id: Set(class_id),
        grade_id: Set(grade_id),
        student_id: Set(student_id.to_string()),
        grade: Set(grade),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
}

impl SeaOrmStorage {
    /// 创建成绩组成，未指定位置时排在最后
    pub async fn create_grade_composition_impl(
        &self,
        class_id: i64,
        req: CreateGradeCompositionRequest,
    ) -> Result<GradeComposition> {
        let position = match req.position {
            Some(position) => position,
            None => GradeCompositions::find()
                .filter(GradeColumn::ClassId.eq(class_id))
                .order_by_desc(GradeColumn::Position)
                .one(&self.db)
                .await
                .map_err(|e| GradebookError::database_operation(format!("查询成绩组成失败: {e}")))?
                .map_or(0, |last| last.position + 1),
        };

        let model = GradeActiveModel {
            class_id: Set(class_id),
            name: Set(req.name),
            weight: Set(req.weight),
            position: Set(position),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("创建成绩组成失败: {e}")))?;

        Ok(result.into_grade_composition())
    }

    pub async fn get_grade_composition_impl(
        &self,
        grade_id: i64,
    ) -> Result<Option<GradeComposition>> {
        let result = GradeCompositions::find_by_id(grade_id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询成绩组成失败: {e}")))?;

        Ok(result.map(|m| m.into_grade_composition()))
    }

    pub async fn list_grade_compositions_impl(
        &self,
        class_id: i64,
    ) -> Result<Vec<GradeComposition>> {
        let result = GradeCompositions::find()
            .filter(GradeColumn::ClassId.eq(class_id))
            .order_by_asc(GradeColumn::Position)
            .order_by_asc(GradeColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询成绩组成失败: {e}")))?;

        Ok(result
            .into_iter()
            .map(|m| m.into_grade_composition())
            .collect())
    }

    /// 登记或修改学生成绩
    pub async fn upsert_student_grade_impl(
        &self,
        class_id: i64,
        grade_id: i64,
        student_id: &str,
        grade: f64,
    ) -> Result<StudentComposition> {
        let now = chrono::Utc::now().timestamp();
        let existing = StudentCompositions::find()
            .filter(Column::GradeId.eq(grade_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询学生成绩失败: {e}")))?;

        let result = match existing {
            Some(model) => {
                let mut model: ActiveModel = model.into();
                model.grade = Set(grade);
                model.updated_at = Set(now);
                model.update(&self.db).await.map_err(|e| {
                    GradebookError::database_operation(format!("保存学生成绩失败: {e}"))
                })?
            }
            // 并发登记同一成绩时由唯一索引兜底
            None => insert_student_grade(&self.db, class_id, grade_id, student_id, grade, now)
                .await
                .map_err(|e| map_insert_err(e, STUDENT_GRADE_EXISTS, "保存学生成绩失败"))?,
        };

        Ok(result.into_student_composition())
    }

    pub async fn get_student_composition_impl(
        &self,
        grade_id: i64,
        student_id: &str,
    ) -> Result<Option<StudentComposition>> {
        let result = StudentCompositions::find()
            .filter(Column::GradeId.eq(grade_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询学生成绩失败: {e}")))?;

        Ok(result.map(|m| m.into_student_composition()))
    }

    pub async fn get_student_composition_by_id_impl(
        &self,
        id: i64,
    ) -> Result<Option<StudentComposition>> {
        let result = StudentCompositions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询学生成绩失败: {e}")))?;

        Ok(result.map(|m| m.into_student_composition()))
    }

    pub async fn list_student_compositions_impl(
        &self,
        class_id: i64,
        student_id: &str,
    ) -> Result<Vec<StudentComposition>> {
        let result = StudentCompositions::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询学生成绩失败: {e}")))?;

        Ok(result
            .into_iter()
            .map(|m| m.into_student_composition())
            .collect())
    }

    /// 确定最终成绩
    ///
    /// 在一个事务中更新 (class, grade, student) 对应的成绩，
    /// 并把该成绩上待处理的复查置为 finalized。没有匹配的成绩时不做任何修改。
    pub async fn finalize_grade_impl(
        &self,
        class_id: i64,
        grade_id: i64,
        student_id: &str,
        final_grade: f64,
    ) -> Result<Option<FinalizeResponse>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        let Some(existing) = StudentCompositions::find()
            .filter(Column::ClassId.eq(class_id))
            .filter(Column::GradeId.eq(grade_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询学生成绩失败: {e}")))?
        else {
            txn.rollback().await?;
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.grade = Set(final_grade);
        model.updated_at = Set(now);
        let student_composition = model
            .update(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("更新学生成绩失败: {e}")))?;

        let pending = ReviewCompositions::find()
            .filter(ReviewColumn::StudentCompositionId.eq(student_composition.id))
            .filter(ReviewColumn::Status.eq(ReviewStatus::Pending.to_string()))
            .one(&txn)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询复查失败: {e}")))?;

        let review = match pending {
            Some(review) => {
                let mut review: ReviewActiveModel = review.into();
                review.status = Set(ReviewStatus::Finalized.to_string());
                review.final_grade = Set(Some(final_grade));
                review.updated_at = Set(now);
                let review = review
                    .update(&txn)
                    .await
                    .map_err(|e| GradebookError::database_operation(format!("更新复查失败: {e}")))?;
                Some(review.into_review())
            }
            None => None,
        };

        txn.commit().await?;

        Ok(Some(FinalizeResponse {
            student_composition: student_composition.into_student_composition(),
            review,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::testing::{seed_class, seed_grade, seed_user};

    #[tokio::test]
    async fn test_grade_compositions_ordered_by_position() {
        let storage = SeaOrmStorage::connect_in_memory().await.unwrap();
        let owner = seed_user(&storage, "t@x.com").await;
        let class = seed_class(&storage, owner, "Physics").await;

        let midterm = seed_grade(&storage, class.id, "Midterm").await;
        let final_exam = seed_grade(&storage, class.id, "Final").await;
        let quiz = storage
            .create_grade_composition_impl(
                class.id,
                CreateGradeCompositionRequest {
                    name: "Quiz".to_string(),
                    weight: 10,
                    position: Some(0),
                },
            )
            .await
            .unwrap();

        assert_eq!(midterm.position, 0);
        assert_eq!(final_exam.position, 1);

        let names: Vec<String> = storage
            .list_grade_compositions_impl(class.id)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        // 相同 position 按 id 排序
        assert_eq!(names, vec!["Midterm", "Quiz", "Final"]);
        assert_eq!(quiz.position, 0);
    }

    #[tokio::test]
    async fn test_upsert_updates_in_place() {
        let storage = SeaOrmStorage::connect_in_memory().await.unwrap();
        let owner = seed_user(&storage, "t@x.com").await;
        let class = seed_class(&storage, owner, "Physics").await;
        let grade = seed_grade(&storage, class.id, "Midterm").await;

        let first = storage
            .upsert_student_grade_impl(class.id, grade.id, "S001", 6.0)
            .await
            .unwrap();
        let second = storage
            .upsert_student_grade_impl(class.id, grade.id, "S001", 7.5)
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.grade, 7.5);
        assert_eq!(
            storage
                .list_student_compositions_impl(class.id, "S001")
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_finalize_updates_exactly_one_row() {
        let storage = SeaOrmStorage::connect_in_memory().await.unwrap();
        let owner = seed_user(&storage, "t@x.com").await;
        let class = seed_class(&storage, owner, "Physics").await;
        let grade = seed_grade(&storage, class.id, "Midterm").await;
        storage
            .upsert_student_grade_impl(class.id, grade.id, "S001", 6.0)
            .await
            .unwrap();
        storage
            .upsert_student_grade_impl(class.id, grade.id, "S002", 5.0)
            .await
            .unwrap();

        let result = storage
            .finalize_grade_impl(class.id, grade.id, "S001", 9.5)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.student_composition.grade, 9.5);
        assert!(result.review.is_none());

        let other = storage
            .get_student_composition_impl(grade.id, "S002")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(other.grade, 5.0);

        // 不匹配的三元组不做任何修改
        assert!(
            storage
                .finalize_grade_impl(class.id + 1, grade.id, "S002", 1.0)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            storage
                .finalize_grade_impl(class.id, grade.id, "S404", 1.0)
                .await
                .unwrap()
                .is_none()
        );
        let other = storage
            .get_student_composition_impl(grade.id, "S002")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(other.grade, 5.0);
    }

    #[tokio::test]
    async fn test_concurrent_student_grade_insert_is_conflict() {
        let storage = SeaOrmStorage::connect_in_memory().await.unwrap();
        let owner = seed_user(&storage, "t@x.com").await;
        let class = seed_class(&storage, owner, "Biology").await;
        let grade = seed_grade(&storage, class.id, "Lab").await;

        let stored = storage
            .upsert_student_grade_impl(class.id, grade.id, "B-1", 5.0)
            .await
            .unwrap();

        // 另一请求在预检之后抢先插入了同一行
        let err = insert_student_grade(&storage.db, class.id, grade.id, "B-1", 6.0, 0)
            .await
            .map_err(|e| map_insert_err(e, STUDENT_GRADE_EXISTS, "保存学生成绩失败"))
            .unwrap_err();
        assert_eq!(err, GradebookError::conflict(STUDENT_GRADE_EXISTS));

        let updated = storage
            .upsert_student_grade_impl(class.id, grade.id, "B-1", 6.5)
            .await
            .unwrap();
        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.grade, 6.5);
    }
}
