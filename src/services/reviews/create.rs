use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ReviewService, resolve_student_composition};
use crate::errors::{GradebookError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    reviews::{entities::Review, requests::CreateReviewRequest},
};
use crate::storage::Storage;

pub async fn handle_create_review(
    service: &ReviewService,
    request: &HttpRequest,
    class_id: i64,
    body: CreateReviewRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;

    let review = create_review(&storage, user.id, class_id, body).await?;
    Ok(ApiResponse::created(review, "Create review successfully").into_response())
}

/// 学生对自己的某项成绩申请复查
///
/// 存在性检查与插入在同一事务中，重复申请返回 409。
pub async fn create_review(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    class_id: i64,
    mut body: CreateReviewRequest,
) -> Result<Review> {
    if !body.expected_grade.is_finite() || body.expected_grade < 0.0 {
        return Err(GradebookError::validation(
            "Expected grade must be a non-negative number",
        ));
    }
    body.explanation = body.explanation.trim().to_string();
    if body.explanation.is_empty() {
        return Err(GradebookError::validation("Explanation is required"));
    }

    let student_composition =
        resolve_student_composition(storage, user_id, class_id, body.grade_id).await?;
    let review = storage.create_review(&student_composition, body).await?;

    info!(
        "Review {} requested by user {} for grade {}",
        review.id, user_id, review.grade_id
    );
    Ok(review)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reviews::entities::ReviewStatus;
    use crate::services::reviews::fixtures::{classroom, review_request};

    #[actix_web::test]
    async fn test_second_request_for_same_grade_conflicts() {
        let room = classroom().await;

        let review = create_review(
            &room.storage,
            room.student.id,
            room.class_id,
            review_request(room.grade.id),
        )
        .await
        .unwrap();
        assert_eq!(review.status, ReviewStatus::Pending);
        assert_eq!(review.current_grade, 6.0);
        assert_eq!(review.expected_grade, 8.5);

        let err = create_review(
            &room.storage,
            room.student.id,
            room.class_id,
            review_request(room.grade.id),
        )
        .await
        .unwrap_err();
        assert_eq!(err, GradebookError::conflict("Review already exists"));

        // 其他学生的成绩不受影响
        assert!(
            create_review(
                &room.storage,
                room.classmate.id,
                room.class_id,
                review_request(room.grade.id),
            )
            .await
            .is_ok()
        );
    }

    #[actix_web::test]
    async fn test_teacher_without_student_id_cannot_request() {
        let room = classroom().await;
        let err = create_review(
            &room.storage,
            room.teacher.id,
            room.class_id,
            review_request(room.grade.id),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "E012");
    }

    #[actix_web::test]
    async fn test_grade_of_other_class_is_not_found() {
        let room = classroom().await;
        let err = create_review(
            &room.storage,
            room.student.id,
            room.class_id + 1,
            review_request(room.grade.id),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "E012");
    }

    #[actix_web::test]
    async fn test_blank_explanation_rejected() {
        let room = classroom().await;
        let mut body = review_request(room.grade.id);
        body.explanation = "  ".to_string();
        let err = create_review(&room.storage, room.student.id, room.class_id, body)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E008");
    }
}
