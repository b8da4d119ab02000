use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ReviewService, review_url};
use crate::errors::{GradebookError, Result};
use crate::models::{
    ApiResponse,
    notifications::entities::NotificationType,
    reviews::{requests::FinalizeReviewRequest, responses::FinalizeResponse},
};
use crate::services::grades::check_grade_in_class;
use crate::services::notifications::notify_users;
use crate::storage::Storage;

pub async fn handle_make_review_final(
    service: &ReviewService,
    request: &HttpRequest,
    class_id: i64,
    body: FinalizeReviewRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let response = make_review_final(&storage, class_id, body).await?;
    Ok(ApiResponse::success(response, "Finalize grade successfully").into_response())
}

/// 教师确定最终成绩
///
/// 更新 (班级, 成绩组成, 学号) 对应的一条成绩；若该成绩有待处理的复查，一并确定并通知学生。
/// 没有复查也允许直接修改成绩。
pub async fn make_review_final(
    storage: &Arc<dyn Storage>,
    class_id: i64,
    body: FinalizeReviewRequest,
) -> Result<FinalizeResponse> {
    if !body.final_grade.is_finite() || body.final_grade < 0.0 {
        return Err(GradebookError::validation(
            "Final grade must be a non-negative number",
        ));
    }
    let grade = check_grade_in_class(storage, class_id, body.grade_id).await?;

    let response = storage
        .finalize_grade(class_id, body.grade_id, &body.student_id, body.final_grade)
        .await?
        .ok_or_else(|| GradebookError::not_found("Student grade not found"))?;
    info!(
        "Grade {} of student {} finalized to {}",
        body.grade_id, body.student_id, body.final_grade
    );

    if let Some(review) = &response.review
        && let Some(member) = storage
            .get_class_user_by_student_id(class_id, &body.student_id)
            .await?
    {
        notify_users(
            storage,
            &[member.user_id],
            class_id,
            NotificationType::ReviewFinal,
            &format!(
                "Your grade review of {} was finalized with {}",
                grade.name, body.final_grade
            ),
            &review_url(class_id, review.grade_id, review.id),
        )
        .await;
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::requests::NotificationListQuery;
    use crate::models::reviews::entities::ReviewStatus;
    use crate::services::reviews::create::create_review;
    use crate::services::reviews::fixtures::{classroom, review_request};

    fn finalize(grade_id: i64, student_id: &str, final_grade: f64) -> FinalizeReviewRequest {
        FinalizeReviewRequest {
            grade_id,
            student_id: student_id.to_string(),
            final_grade,
        }
    }

    #[actix_web::test]
    async fn test_review_lifecycle() {
        let room = classroom().await;
        let review = create_review(
            &room.storage,
            room.student.id,
            room.class_id,
            review_request(room.grade.id),
        )
        .await
        .unwrap();

        let response = make_review_final(
            &room.storage,
            room.class_id,
            finalize(room.grade.id, "S1", 9.5),
        )
        .await
        .unwrap();
        assert_eq!(response.student_composition.grade, 9.5);
        let finalized = response.review.unwrap();
        assert_eq!(finalized.id, review.id);
        assert_eq!(finalized.status, ReviewStatus::Finalized);
        assert_eq!(finalized.final_grade, Some(9.5));

        // 只改了 S1 的成绩
        let s2 = room
            .storage
            .get_student_composition(room.grade.id, "S2")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(s2.grade, 8.0);

        let notifications = room
            .storage
            .list_notifications(
                room.student.id,
                NotificationListQuery {
                    pagination: Default::default(),
                },
            )
            .await
            .unwrap();
        assert_eq!(notifications.items.len(), 1);
        assert_eq!(
            notifications.items[0].notification_type,
            NotificationType::ReviewFinal
        );

        // 已确定的复查不能再次申请
        let err = create_review(
            &room.storage,
            room.student.id,
            room.class_id,
            review_request(room.grade.id),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "E013");
    }

    #[actix_web::test]
    async fn test_finalize_without_review_only_updates_grade() {
        let room = classroom().await;

        let response = make_review_final(
            &room.storage,
            room.class_id,
            finalize(room.grade.id, "S2", 7.0),
        )
        .await
        .unwrap();
        assert!(response.review.is_none());
        assert_eq!(response.student_composition.grade, 7.0);
    }

    #[actix_web::test]
    async fn test_unknown_student_changes_nothing() {
        let room = classroom().await;

        let err = make_review_final(
            &room.storage,
            room.class_id,
            finalize(room.grade.id, "S9", 9.5),
        )
        .await
        .unwrap_err();
        assert_eq!(err, GradebookError::not_found("Student grade not found"));

        for (code, expected) in [("S1", 6.0), ("S2", 8.0)] {
            let score = room
                .storage
                .get_student_composition(room.grade.id, code)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(score.grade, expected);
        }
    }
}
