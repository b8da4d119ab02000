use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ReviewService, resolve_student_composition};
use crate::errors::{GradebookError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    reviews::{entities::Review, requests::ReviewQuery, responses::ReviewListItem},
};
use crate::services::grades::check_grade_in_class;
use crate::storage::Storage;

pub async fn handle_get_student_review(
    service: &ReviewService,
    request: &HttpRequest,
    query: ReviewQuery,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;
    let review = get_student_review(&storage, user.id, query.class_id, query.grade_id).await?;
    Ok(ApiResponse::success(review, "Successfully").into_response())
}

pub async fn handle_list_reviews(
    service: &ReviewService,
    request: &HttpRequest,
    query: ReviewQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let reviews = list_reviews(&storage, query.class_id, query.grade_id).await?;
    Ok(ApiResponse::success(reviews, "Successfully").into_response())
}

/// 学生查看自己某个成绩组成的复查
pub async fn get_student_review(
    storage: &Arc<dyn Storage>,
    user_id: i64,
    class_id: i64,
    grade_id: Option<i64>,
) -> Result<Review> {
    let grade_id =
        grade_id.ok_or_else(|| GradebookError::bad_request("Missing required parameter"))?;
    let student_composition =
        resolve_student_composition(storage, user_id, class_id, grade_id).await?;

    storage
        .get_review_by_student_composition(student_composition.id)
        .await?
        .ok_or_else(|| GradebookError::not_found("Review not found"))
}

/// 班级的复查列表，可按成绩组成过滤
pub async fn list_reviews(
    storage: &Arc<dyn Storage>,
    class_id: i64,
    grade_id: Option<i64>,
) -> Result<Vec<ReviewListItem>> {
    if let Some(grade_id) = grade_id {
        check_grade_in_class(storage, class_id, grade_id).await?;
    }
    storage.list_reviews(class_id, grade_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reviews::create::create_review;
    use crate::services::reviews::fixtures::{classroom, review_request};

    #[actix_web::test]
    async fn test_student_finds_own_review() {
        let room = classroom().await;
        let err = get_student_review(&room.storage, room.student.id, room.class_id, Some(room.grade.id))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E012");

        let created = create_review(
            &room.storage,
            room.student.id,
            room.class_id,
            review_request(room.grade.id),
        )
        .await
        .unwrap();
        let found = get_student_review(&room.storage, room.student.id, room.class_id, Some(room.grade.id))
            .await
            .unwrap();
        assert_eq!(found.id, created.id);

        let err = get_student_review(&room.storage, room.student.id, room.class_id, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E009");
    }

    #[actix_web::test]
    async fn test_teacher_lists_reviews_with_student_ids() {
        let room = classroom().await;
        for user in [&room.student, &room.classmate] {
            create_review(
                &room.storage,
                user.id,
                room.class_id,
                review_request(room.grade.id),
            )
            .await
            .unwrap();
        }

        let reviews = list_reviews(&room.storage, room.class_id, Some(room.grade.id))
            .await
            .unwrap();
        let codes: Vec<&str> = reviews.iter().map(|r| r.student_id.as_str()).collect();
        assert_eq!(codes, ["S1", "S2"]);

        let err = list_reviews(&room.storage, room.class_id, Some(room.grade.id + 1))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E012");
    }
}
