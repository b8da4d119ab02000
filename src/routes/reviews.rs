use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::class_users::entities::ClassUserRole;
use crate::models::classes::requests::ClassIdQuery;
use crate::models::reviews::requests::{
    CreateReviewRequest, FinalizeReviewRequest, PostCommentRequest, ReviewQuery,
};
use crate::services::ReviewService;

static REVIEW_SERVICE: Lazy<ReviewService> = Lazy::new(ReviewService::new_lazy);

pub async fn create_review(
    req: HttpRequest,
    query: web::Query<ClassIdQuery>,
    body: web::Json<CreateReviewRequest>,
) -> ActixResult<HttpResponse> {
    REVIEW_SERVICE
        .create_review(&req, query.class_id, body.into_inner())
        .await
}

pub async fn get_student_review(
    req: HttpRequest,
    query: web::Query<ReviewQuery>,
) -> ActixResult<HttpResponse> {
    REVIEW_SERVICE
        .get_student_review(&req, query.into_inner())
        .await
}

pub async fn list_reviews(
    req: HttpRequest,
    query: web::Query<ReviewQuery>,
) -> ActixResult<HttpResponse> {
    REVIEW_SERVICE.list_reviews(&req, query.into_inner()).await
}

pub async fn post_comment(
    req: HttpRequest,
    query: web::Query<ClassIdQuery>,
    body: web::Json<PostCommentRequest>,
) -> ActixResult<HttpResponse> {
    REVIEW_SERVICE
        .post_comment(&req, query.class_id, body.into_inner())
        .await
}

pub async fn get_comments(
    req: HttpRequest,
    query: web::Query<ReviewQuery>,
) -> ActixResult<HttpResponse> {
    REVIEW_SERVICE.get_comments(&req, query.into_inner()).await
}

pub async fn make_review_final(
    req: HttpRequest,
    query: web::Query<ClassIdQuery>,
    body: web::Json<FinalizeReviewRequest>,
) -> ActixResult<HttpResponse> {
    REVIEW_SERVICE
        .make_review_final(&req, query.class_id, body.into_inner())
        .await
}

// 配置路由
pub fn configure_review_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/review")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/request").route(
                    web::post()
                        .to(create_review)
                        .wrap(middlewares::RequireClassRole::new(&ClassUserRole::Student)),
                ),
            )
            .service(
                web::resource("/student").route(
                    web::get()
                        .to(get_student_review)
                        .wrap(middlewares::RequireClassRole::new(&ClassUserRole::Student)),
                ),
            )
            .service(
                web::resource("/list").route(
                    web::get()
                        .to(list_reviews)
                        .wrap(middlewares::RequireClassRole::new(&ClassUserRole::Teacher)),
                ),
            )
            .service(
                // 评论双方都可参与，具体权限在服务层按复查归属校验
                web::resource("/comment").route(
                    web::post()
                        .to(post_comment)
                        .wrap(middlewares::RequireClassRole::new_any(
                            ClassUserRole::all_roles(),
                        )),
                ),
            )
            .service(
                web::resource("/comments").route(
                    web::get()
                        .to(get_comments)
                        .wrap(middlewares::RequireClassRole::new_any(
                            ClassUserRole::all_roles(),
                        )),
                ),
            )
            .service(
                web::resource("/final").route(
                    web::post()
                        .to(make_review_final)
                        .wrap(middlewares::RequireClassRole::new(&ClassUserRole::Teacher)),
                ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{bearer, storage_data};
    use crate::services::reviews::fixtures::classroom;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_review_flow_over_http() {
        let room = classroom().await;
        let app = test::init_service(
            App::new()
                .app_data(storage_data(&room.storage))
                .configure(configure_review_routes),
        )
        .await;
        let class_id = room.class_id;
        let grade_id = room.grade.id;

        // 教师不能以学生身份申请复查
        let req = test::TestRequest::post()
            .uri(&format!("/review/request?class_id={class_id}"))
            .insert_header(bearer(room.teacher.id))
            .set_json(json!({"gradeId": grade_id, "expectedGrade": 9, "explanation": "x"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri(&format!("/review/request?class_id={class_id}"))
            .insert_header(bearer(room.student.id))
            .set_json(json!({
                "gradeId": grade_id,
                "expectedGrade": 9,
                "explanation": "Recount question 3"
            }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let json: Value = test::read_body_json(res).await;
        assert_eq!(json["data"]["status"], "pending");
        assert_eq!(json["data"]["currentGrade"], 6.0);
        let review_id = json["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/review/comment?class_id={class_id}"))
            .insert_header(bearer(room.teacher.id))
            .set_json(json!({"gradeId": grade_id, "reviewId": review_id, "content": "Looking"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        // 同班同学看不到别人的复查评论
        let uri = format!(
            "/review/comments?class_id={class_id}&grade_id={grade_id}&review_id={review_id}"
        );
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(room.classmate.id))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(room.student.id))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let json: Value = test::read_body_json(res).await;
        assert_eq!(json["data"][0]["content"], "Looking");
        assert_eq!(json["data"][0]["fullname"], "User teacher@x.com");

        let req = test::TestRequest::get()
            .uri(&format!("/review/list?class_id={class_id}"))
            .insert_header(bearer(room.teacher.id))
            .to_request();
        let res = test::call_service(&app, req).await;
        let json: Value = test::read_body_json(res).await;
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"][0]["studentId"], "S1");

        let req = test::TestRequest::post()
            .uri(&format!("/review/final?class_id={class_id}"))
            .insert_header(bearer(room.teacher.id))
            .set_json(json!({"gradeId": grade_id, "studentId": "S1", "finalGrade": 7.5}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let json: Value = test::read_body_json(res).await;
        assert_eq!(json["data"]["review"]["status"], "finalized");
        assert_eq!(json["data"]["studentComposition"]["grade"], 7.5);

        let req = test::TestRequest::get()
            .uri(&format!("/review/student?class_id={class_id}&grade_id={grade_id}"))
            .insert_header(bearer(room.student.id))
            .to_request();
        let res = test::call_service(&app, req).await;
        let json: Value = test::read_body_json(res).await;
        assert_eq!(json["data"]["finalGrade"], 7.5);
    }

    #[actix_web::test]
    async fn test_student_cannot_list_or_finalize() {
        let room = classroom().await;
        let app = test::init_service(
            App::new()
                .app_data(storage_data(&room.storage))
                .configure(configure_review_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/review/list?class_id={}", room.class_id))
            .insert_header(bearer(room.student.id))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );

        let req = test::TestRequest::post()
            .uri(&format!("/review/final?class_id={}", room.class_id))
            .insert_header(bearer(room.student.id))
            .set_json(json!({"gradeId": room.grade.id, "studentId": "S1", "finalGrade": 10}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );
    }
}
