use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{ReviewService, load_accessible_review, review_url};
use crate::errors::{GradebookError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    notifications::entities::NotificationType,
    reviews::{
        requests::{PostCommentRequest, ReviewQuery},
        responses::CommentResponse,
    },
    users::entities::User,
};
use crate::services::notifications::notify_users;
use crate::storage::Storage;

const MISSING_PARAMETER: &str = "Missing required parameter";

pub async fn handle_post_comment(
    service: &ReviewService,
    request: &HttpRequest,
    class_id: i64,
    body: PostCommentRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;

    let comment = post_comment(&storage, &user, class_id, body).await?;
    Ok(ApiResponse::created(comment, "Post comment successfully").into_response())
}

pub async fn handle_get_comments(
    service: &ReviewService,
    request: &HttpRequest,
    query: ReviewQuery,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;

    let comments = get_comments(
        &storage,
        &user,
        query.class_id,
        query.grade_id,
        query.review_id,
    )
    .await?;
    Ok(ApiResponse::success(comments, "Successfully").into_response())
}

/// 发表评论并通知对方
///
/// 学生评论时通知班级教师，其他人评论时通知复查的学生。
pub async fn post_comment(
    storage: &Arc<dyn Storage>,
    user: &User,
    class_id: i64,
    body: PostCommentRequest,
) -> Result<CommentResponse> {
    let content = body.content.trim();
    if content.is_empty() {
        return Err(GradebookError::validation("Comment content is required"));
    }

    let (review, student_composition) =
        load_accessible_review(storage, user, class_id, body.grade_id, body.review_id).await?;

    let comment = storage.create_comment(review.id, user.id, content).await?;
    info!("User {} commented on review {}", user.id, review.id);

    let student_user_id = storage
        .get_class_user_by_student_id(class_id, &student_composition.student_id)
        .await?
        .map(|m| m.user_id);
    let recipients: Vec<i64> = if student_user_id == Some(user.id) {
        storage
            .list_class_teacher_ids(class_id)
            .await?
            .into_iter()
            .filter(|&id| id != user.id)
            .collect()
    } else {
        student_user_id.into_iter().collect()
    };

    let grade_name = storage
        .get_grade_composition(review.grade_id)
        .await?
        .map(|g| g.name)
        .unwrap_or_default();
    notify_users(
        storage,
        &recipients,
        class_id,
        NotificationType::ReviewComment,
        &format!(
            "{} commented on the grade review of {}",
            user.fullname, grade_name
        ),
        &review_url(class_id, review.grade_id, review.id),
    )
    .await;

    Ok(CommentResponse {
        comment,
        fullname: user.fullname.clone(),
        img_url: user.img_url.clone(),
    })
}

/// 复查的评论，按发表顺序排列
pub async fn get_comments(
    storage: &Arc<dyn Storage>,
    user: &User,
    class_id: i64,
    grade_id: Option<i64>,
    review_id: Option<i64>,
) -> Result<Vec<CommentResponse>> {
    let (Some(grade_id), Some(review_id)) = (grade_id, review_id) else {
        return Err(GradebookError::bad_request(MISSING_PARAMETER));
    };

    let (review, _) = load_accessible_review(storage, user, class_id, grade_id, review_id).await?;
    storage.list_comments(review.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::requests::NotificationListQuery;
    use crate::models::reviews::entities::Review;
    use crate::services::reviews::create::create_review;
    use crate::services::reviews::fixtures::{Classroom, classroom, review_request};

    async fn open_review(room: &Classroom) -> Review {
        create_review(
            &room.storage,
            room.student.id,
            room.class_id,
            review_request(room.grade.id),
        )
        .await
        .unwrap()
    }

    fn comment(grade_id: i64, review_id: i64, content: &str) -> PostCommentRequest {
        PostCommentRequest {
            grade_id,
            review_id,
            content: content.to_string(),
        }
    }

    async fn notification_count(room: &Classroom, user_id: i64) -> usize {
        room.storage
            .list_notifications(
                user_id,
                NotificationListQuery {
                    pagination: Default::default(),
                },
            )
            .await
            .unwrap()
            .items
            .len()
    }

    #[actix_web::test]
    async fn test_comments_notify_the_other_side() {
        let room = classroom().await;
        let review = open_review(&room).await;

        post_comment(
            &room.storage,
            &room.student,
            room.class_id,
            comment(room.grade.id, review.id, "Please recheck question 2"),
        )
        .await
        .unwrap();
        assert_eq!(notification_count(&room, room.teacher.id).await, 1);
        assert_eq!(notification_count(&room, room.student.id).await, 0);

        post_comment(
            &room.storage,
            &room.teacher,
            room.class_id,
            comment(room.grade.id, review.id, "Rechecked"),
        )
        .await
        .unwrap();
        assert_eq!(notification_count(&room, room.student.id).await, 1);

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
        let notification = &notifications.items[0];
        assert_eq!(notification.notification_type, NotificationType::ReviewComment);
        assert_eq!(
            notification.content_url.as_deref(),
            Some(review_url(room.class_id, room.grade.id, review.id).as_str())
        );
    }

    #[actix_web::test]
    async fn test_comment_requires_grade_of_the_class() {
        let room = classroom().await;
        let review = open_review(&room).await;

        let err = post_comment(
            &room.storage,
            &room.teacher,
            room.class_id + 1,
            comment(room.grade.id, review.id, "hello"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "E012");

        let err = post_comment(
            &room.storage,
            &room.teacher,
            room.class_id,
            comment(room.grade.id + 1, review.id, "hello"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "E012");
    }

    #[actix_web::test]
    async fn test_classmate_cannot_comment_on_other_review() {
        let room = classroom().await;
        let review = open_review(&room).await;

        let err = post_comment(
            &room.storage,
            &room.classmate,
            room.class_id,
            comment(room.grade.id, review.id, "me too"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "E011");
    }

    #[actix_web::test]
    async fn test_get_comments_requires_both_ids() {
        let room = classroom().await;
        let review = open_review(&room).await;

        for (grade_id, review_id) in [(None, Some(review.id)), (Some(room.grade.id), None), (None, None)] {
            let err = get_comments(&room.storage, &room.teacher, room.class_id, grade_id, review_id)
                .await
                .unwrap_err();
            assert_eq!(err, GradebookError::bad_request(MISSING_PARAMETER));
        }
    }

    #[actix_web::test]
    async fn test_get_comments_in_order_with_author() {
        let room = classroom().await;
        let review = open_review(&room).await;

        for (author, text) in [
            (&room.student, "first"),
            (&room.teacher, "second"),
            (&room.student, "third"),
        ] {
            post_comment(
                &room.storage,
                author,
                room.class_id,
                comment(room.grade.id, review.id, text),
            )
            .await
            .unwrap();
        }

        let comments = get_comments(
            &room.storage,
            &room.student,
            room.class_id,
            Some(room.grade.id),
            Some(review.id),
        )
        .await
        .unwrap();
        let contents: Vec<&str> = comments.iter().map(|c| c.comment.content.as_str()).collect();
        assert_eq!(contents, ["first", "second", "third"]);
        assert_eq!(comments[1].fullname, room.teacher.fullname);
        assert_eq!(comments[1].img_url, room.teacher.img_url);
        assert!(comments.windows(2).all(|w| w[0].comment.id < w[1].comment.id));
    }
}
