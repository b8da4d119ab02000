//! 成绩复查
//!
//! 每条学生成绩最多一条复查，状态只会从 `pending` 变为 `finalized`。
//! 学生通过自己在班级中的学号定位成绩；教师可以查看并确定班级内所有复查。

pub mod comments;
pub mod create;
pub mod finalize;
pub mod query;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{GradebookError, Result};
use crate::models::{
    grades::entities::StudentComposition,
    reviews::{
        entities::Review,
        requests::{CreateReviewRequest, FinalizeReviewRequest, PostCommentRequest, ReviewQuery},
    },
    users::entities::{User, UserRole},
};
use crate::services::grades::check_grade_in_class;
use crate::storage::Storage;

pub struct ReviewService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReviewService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    // 学生申请复查
    pub async fn create_review(
        &self,
        request: &HttpRequest,
        class_id: i64,
        body: CreateReviewRequest,
    ) -> ActixResult<HttpResponse> {
        create::handle_create_review(self, request, class_id, body).await
    }

    // 学生查看自己某个成绩组成的复查
    pub async fn get_student_review(
        &self,
        request: &HttpRequest,
        query: ReviewQuery,
    ) -> ActixResult<HttpResponse> {
        query::handle_get_student_review(self, request, query).await
    }

    // 教师查看班级复查列表
    pub async fn list_reviews(
        &self,
        request: &HttpRequest,
        query: ReviewQuery,
    ) -> ActixResult<HttpResponse> {
        query::handle_list_reviews(self, request, query).await
    }

    pub async fn post_comment(
        &self,
        request: &HttpRequest,
        class_id: i64,
        body: PostCommentRequest,
    ) -> ActixResult<HttpResponse> {
        comments::handle_post_comment(self, request, class_id, body).await
    }

    pub async fn get_comments(
        &self,
        request: &HttpRequest,
        query: ReviewQuery,
    ) -> ActixResult<HttpResponse> {
        comments::handle_get_comments(self, request, query).await
    }

    // 教师确定最终成绩
    pub async fn make_review_final(
        &self,
        request: &HttpRequest,
        class_id: i64,
        body: FinalizeReviewRequest,
    ) -> ActixResult<HttpResponse> {
        finalize::handle_make_review_final(self, request, class_id, body).await
    }
}

/// 复查详情页地址，随通知下发
pub(crate) fn review_url(class_id: i64, grade_id: i64, review_id: i64) -> String {
    format!("/review?class_id={class_id}&grade_id={grade_id}&review_id={review_id}")
}

/// 通过学生在班级中的学号定位其某个成绩组成的得分
pub(crate) async fn resolve_student_composition(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    class_id: i64,
    grade_id: i64,
) -> Result<StudentComposition> {
    let student_id = storage
        .get_class_user(user_id, class_id)
        .await?
        .and_then(|m| m.student_id)
        .ok_or_else(|| GradebookError::not_found("Student ID not found in this class"))?;

    check_grade_in_class(storage, class_id, grade_id).await?;

    storage
        .get_student_composition(grade_id, &student_id)
        .await?
        .ok_or_else(|| GradebookError::not_found("Grade not found for this student"))
}

/// 确认复查属于该班级的该成绩组成，并且当前用户有权查看
///
/// 教师和管理员可以访问班级内任意复查，学生只能访问自己的复查。
/// 返回复查及其对应的学生成绩。
pub(crate) async fn load_accessible_review(
    storage: &Arc<dyn Storage>,
    user: &User,
    class_id: i64,
    grade_id: i64,
    review_id: i64,
) -> Result<(Review, StudentComposition)> {
    check_grade_in_class(storage, class_id, grade_id).await?;

    let review = storage
        .get_review_by_id(review_id)
        .await?
        .filter(|review| review.grade_id == grade_id)
        .ok_or_else(|| GradebookError::not_found("Review not found"))?;
    let student_composition = storage
        .get_student_composition_by_id(review.student_composition_id)
        .await?
        .filter(|sc| sc.class_id == class_id)
        .ok_or_else(|| GradebookError::not_found("Review not found"))?;

    if user.role != UserRole::Admin {
        let member = storage
            .get_class_user(user.id, class_id)
            .await?
            .ok_or_else(|| GradebookError::authorization("No permission for this class"))?;
        let owns_review = member.student_id.as_deref() == Some(&student_composition.student_id);
        if !member.is_teacher() && !owns_review {
            return Err(GradebookError::authorization(
                "No permission for this review",
            ));
        }
    }

    Ok((review, student_composition))
}
