//! 复查与评论存储操作

use super::{SeaOrmStorage, map_insert_err};
use crate::entity::comment_reviews::{
    ActiveModel as CommentActiveModel, Column as CommentColumn, Entity as CommentReviews,
};
use crate::entity::review_compositions::{ActiveModel, Column, Entity as ReviewCompositions};
use crate::entity::student_compositions::{
    Column as StudentCompositionColumn, Entity as StudentCompositions,
};
use crate::entity::users::Entity as Users;
use crate::errors::{GradebookError, Result};
use crate::models::{
    grades::entities::StudentComposition,
    reviews::{
        entities::{Comment, Review, ReviewStatus},
        requests::CreateReviewRequest,
        responses::{CommentResponse, ReviewListItem},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

const REVIEW_EXISTS: &str = "Review already exists";

async fn review_exists<C: ConnectionTrait>(conn: &C, student_composition_id: i64) -> Result<bool> {
    let count = ReviewCompositions::find()
        .filter(Column::StudentCompositionId.eq(student_composition_id))
        .count(conn)
        .await
        .map_err(|e| GradebookError::database_operation(format!("查询复查失败: {e}")))?;
    Ok(count > 0)
}

impl SeaOrmStorage {
    /// 创建复查
    ///
    /// 检查与插入在同一事务中完成；并发的重复请求由唯一索引拦截，同样返回 Conflict。
    pub async fn create_review_impl(
        &self,
        student_composition: &StudentComposition,
        req: CreateReviewRequest,
    ) -> Result<Review> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.db.begin().await?;

        if review_exists(&txn, student_composition.id).await? {
            txn.rollback().await?;
            return Err(GradebookError::conflict(REVIEW_EXISTS));
        }

        let review = ActiveModel {
            student_composition_id: Set(student_composition.id),
            grade_id: Set(student_composition.grade_id),
            current_grade: Set(student_composition.grade),
            expected_grade: Set(req.expected_grade),
            explanation: Set(req.explanation),
            status: Set(ReviewStatus::Pending.to_string()),
            final_grade: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| map_insert_err(e, REVIEW_EXISTS, "创建复查失败"))?;

        txn.commit().await?;
        Ok(review.into_review())
    }

    pub async fn is_existed_review_impl(&self, student_composition_id: i64) -> Result<bool> {
        review_exists(&self.db, student_composition_id).await
    }

    pub async fn get_review_by_id_impl(&self, review_id: i64) -> Result<Option<Review>> {
        let result = ReviewCompositions::find_by_id(review_id)
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询复查失败: {e}")))?;

        Ok(result.map(|m| m.into_review()))
    }

    pub async fn get_review_by_student_composition_impl(
        &self,
        student_composition_id: i64,
    ) -> Result<Option<Review>> {
        let result = ReviewCompositions::find()
            .filter(Column::StudentCompositionId.eq(student_composition_id))
            .one(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询复查失败: {e}")))?;

        Ok(result.map(|m| m.into_review()))
    }

    /// 列出班级的复查
    pub async fn list_reviews_impl(
        &self,
        class_id: i64,
        grade_id: Option<i64>,
    ) -> Result<Vec<ReviewListItem>> {
        let mut select = ReviewCompositions::find()
            .find_also_related(StudentCompositions)
            .filter(StudentCompositionColumn::ClassId.eq(class_id));
        if let Some(grade_id) = grade_id {
            select = select.filter(Column::GradeId.eq(grade_id));
        }

        let rows = select
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询复查列表失败: {e}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|(review, student_composition)| {
                Some(ReviewListItem {
                    student_id: student_composition?.student_id,
                    review: review.into_review(),
                })
            })
            .collect())
    }

    /// 添加评论
    pub async fn create_comment_impl(
        &self,
        review_id: i64,
        user_id: i64,
        content: &str,
    ) -> Result<Comment> {
        let model = CommentActiveModel {
            review_id: Set(review_id),
            user_id: Set(user_id),
            content: Set(content.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("创建评论失败: {e}")))?;

        Ok(result.into_comment())
    }

    /// 列出评论，按创建顺序（id 升序）
    pub async fn list_comments_impl(&self, review_id: i64) -> Result<Vec<CommentResponse>> {
        let rows = CommentReviews::find()
            .filter(CommentColumn::ReviewId.eq(review_id))
            .order_by_asc(CommentColumn::Id)
            .find_also_related(Users)
            .all(&self.db)
            .await
            .map_err(|e| GradebookError::database_operation(format!("查询评论失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(comment, user)| {
                let (fullname, img_url) = user
                    .map(|u| (u.fullname, u.img_url))
                    .unwrap_or_default();
                CommentResponse {
                    comment: comment.into_comment(),
                    fullname,
                    img_url,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::testing::{seed_class, seed_grade, seed_user};

    fn review_request(grade_id: i64) -> CreateReviewRequest {
        CreateReviewRequest {
            grade_id,
            expected_grade: 9.0,
            explanation: "Question 3 was graded wrong".to_string(),
        }
    }

    #[tokio::test]
    async fn test_second_review_conflicts() {
        let storage = SeaOrmStorage::connect_in_memory().await.unwrap();
        let owner = seed_user(&storage, "t@x.com").await;
        let class = seed_class(&storage, owner, "Chem").await;
        let grade = seed_grade(&storage, class.id, "Lab").await;
        let sc = storage
            .upsert_student_grade_impl(class.id, grade.id, "S001", 6.0)
            .await
            .unwrap();

        let review = storage
            .create_review_impl(&sc, review_request(grade.id))
            .await
            .unwrap();
        assert_eq!(review.status, ReviewStatus::Pending);
        assert_eq!(review.current_grade, 6.0);
        assert!(storage.is_existed_review_impl(sc.id).await.unwrap());

        let err = storage
            .create_review_impl(&sc, review_request(grade.id))
            .await
            .unwrap_err();
        assert_eq!(err, GradebookError::conflict(REVIEW_EXISTS));
    }

    #[tokio::test]
    async fn test_unique_index_blocks_duplicate_insert() {
        let storage = SeaOrmStorage::connect_in_memory().await.unwrap();
        let owner = seed_user(&storage, "t@x.com").await;
        let class = seed_class(&storage, owner, "Chem").await;
        let grade = seed_grade(&storage, class.id, "Lab").await;
        let sc = storage
            .upsert_student_grade_impl(class.id, grade.id, "S001", 6.0)
            .await
            .unwrap();
        storage
            .create_review_impl(&sc, review_request(grade.id))
            .await
            .unwrap();

        // 绕过存在性检查直接插入
        let now = chrono::Utc::now().timestamp();
        let err = ActiveModel {
            student_composition_id: Set(sc.id),
            grade_id: Set(grade.id),
            current_grade: Set(6.0),
            expected_grade: Set(8.0),
            explanation: Set("again".to_string()),
            status: Set(ReviewStatus::Pending.to_string()),
            final_grade: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&storage.db)
        .await
        .map_err(|e| map_insert_err(e, REVIEW_EXISTS, "创建复查失败"))
        .unwrap_err();
        assert_eq!(err, GradebookError::conflict(REVIEW_EXISTS));
    }

    #[tokio::test]
    async fn test_comments_in_creation_order_with_author() {
        let storage = SeaOrmStorage::connect_in_memory().await.unwrap();
        let teacher = seed_user(&storage, "t@x.com").await;
        let student = seed_user(&storage, "s@x.com").await;
        let class = seed_class(&storage, teacher, "Chem").await;
        let grade = seed_grade(&storage, class.id, "Lab").await;
        let sc = storage
            .upsert_student_grade_impl(class.id, grade.id, "S001", 6.0)
            .await
            .unwrap();
        let review = storage
            .create_review_impl(&sc, review_request(grade.id))
            .await
            .unwrap();

        storage
            .create_comment_impl(review.id, student, "Please check")
            .await
            .unwrap();
        storage
            .create_comment_impl(review.id, teacher, "Checked")
            .await
            .unwrap();

        let comments = storage.list_comments_impl(review.id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert!(comments[0].comment.id < comments[1].comment.id);
        assert_eq!(comments[0].comment.content, "Please check");
        assert_eq!(comments[0].fullname, "User s@x.com");
        assert_eq!(comments[1].img_url.as_deref(), Some("https://img/t@x.com"));
    }

    #[tokio::test]
    async fn test_list_reviews_scoped_to_class_and_grade() {
        let storage = SeaOrmStorage::connect_in_memory().await.unwrap();
        let teacher = seed_user(&storage, "t@x.com").await;
        let class = seed_class(&storage, teacher, "Chem").await;
        let other_class = seed_class(&storage, teacher, "Bio").await;
        let lab = seed_grade(&storage, class.id, "Lab").await;
        let exam = seed_grade(&storage, class.id, "Exam").await;
        let other = seed_grade(&storage, other_class.id, "Other").await;

        for (class_id, grade_id) in [(class.id, lab.id), (class.id, exam.id), (other_class.id, other.id)] {
            let sc = storage
                .upsert_student_grade_impl(class_id, grade_id, "S001", 5.0)
                .await
                .unwrap();
            storage
                .create_review_impl(&sc, review_request(grade_id))
                .await
                .unwrap();
        }

        let all = storage.list_reviews_impl(class.id, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|item| item.student_id == "S001"));

        let lab_only = storage
            .list_reviews_impl(class.id, Some(lab.id))
            .await
            .unwrap();
        assert_eq!(lab_only.len(), 1);
        assert_eq!(lab_only[0].review.grade_id, lab.id);
    }
}
