use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::class_users::entities::ClassUserRole;
use crate::models::classes::requests::{
    AddUserToClassRequest, ClassIdQuery, CreateClassRequest, InviteRequest, VerifyInviteRequest,
};
use crate::models::grades::requests::{CreateGradeCompositionRequest, SetStudentGradeRequest};
use crate::models::users::entities::UserRole;
use crate::services::{ClassService, GradeService};

// 懒加载的全局服务实例
static CLASS_SERVICE: Lazy<ClassService> = Lazy::new(ClassService::new_lazy);
static GRADE_SERVICE: Lazy<GradeService> = Lazy::new(GradeService::new_lazy);

pub async fn create_class(
    req: HttpRequest,
    class_data: web::Json<CreateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .create_class(&req, class_data.into_inner())
        .await
}

pub async fn add_user_to_class(
    req: HttpRequest,
    body: web::Json<AddUserToClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .add_user_to_class(&req, body.into_inner())
        .await
}

pub async fn list_class_users(
    req: HttpRequest,
    query: web::Query<ClassIdQuery>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.list_class_users(&req, query.class_id).await
}

pub async fn list_user_classes(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.list_user_classes(&req).await
}

pub async fn get_class_role(
    req: HttpRequest,
    query: web::Query<ClassIdQuery>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.get_class_role(&req, query.class_id).await
}

pub async fn get_invite_link(
    req: HttpRequest,
    body: web::Json<InviteRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.get_invite_link(&req, body.into_inner()).await
}

pub async fn verify_invite(
    req: HttpRequest,
    body: web::Json<VerifyInviteRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.verify_invite(&req, body.into_inner()).await
}

pub async fn create_grade_composition(
    req: HttpRequest,
    query: web::Query<ClassIdQuery>,
    body: web::Json<CreateGradeCompositionRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .create_grade_composition(&req, query.class_id, body.into_inner())
        .await
}

pub async fn list_grade_compositions(
    req: HttpRequest,
    query: web::Query<ClassIdQuery>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .list_grade_compositions(&req, query.class_id)
        .await
}

pub async fn set_student_grade(
    req: HttpRequest,
    query: web::Query<ClassIdQuery>,
    body: web::Json<SetStudentGradeRequest>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE
        .set_student_grade(&req, query.class_id, body.into_inner())
        .await
}

pub async fn my_grades(
    req: HttpRequest,
    query: web::Query<ClassIdQuery>,
) -> ActixResult<HttpResponse> {
    GRADE_SERVICE.my_grades(&req, query.class_id).await
}

// 配置路由
pub fn configure_classes_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/class")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/management").route(
                    web::post()
                        .to(create_class)
                        .wrap(middlewares::RequireRole::new_any(UserRole::user_roles())),
                ),
            )
            .service(
                // 只有班级教师可以添加成员，在服务层校验
                web::resource("/management/add-user").route(
                    web::post()
                        .to(add_user_to_class)
                        .wrap(middlewares::RequireRole::new_any(UserRole::user_roles())),
                ),
            )
            .service(
                web::resource("/users").route(
                    web::get()
                        .to(list_class_users)
                        .wrap(middlewares::RequireClassRole::new_any(
                            ClassUserRole::all_roles(),
                        )),
                ),
            )
            .service(
                web::resource("/user-classes").route(
                    web::get()
                        .to(list_user_classes)
                        .wrap(middlewares::RequireRole::new_any(UserRole::user_roles())),
                ),
            )
            .route("/role", web::get().to(get_class_role))
            .route("/invite", web::post().to(get_invite_link))
            .route("/verify-invite", web::post().to(verify_invite))
            .service(
                web::resource("/grades")
                    .route(
                        web::post()
                            .to(create_grade_composition)
                            .wrap(middlewares::RequireClassRole::new(&ClassUserRole::Teacher)),
                    )
                    .route(
                        web::get()
                            .to(list_grade_compositions)
                            .wrap(middlewares::RequireClassRole::new_any(
                                ClassUserRole::all_roles(),
                            )),
                    ),
            )
            .service(
                web::resource("/grades/student").route(
                    web::put()
                        .to(set_student_grade)
                        .wrap(middlewares::RequireClassRole::new(&ClassUserRole::Teacher)),
                ),
            )
            .service(
                web::resource("/grades/me").route(
                    web::get()
                        .to(my_grades)
                        .wrap(middlewares::RequireClassRole::new(&ClassUserRole::Student)),
                ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{bearer, storage_data};
    use crate::services::testing::{create_user, join_as_student, memory_storage};
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_create_class_and_list_members() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@x.com").await;
        let student = create_user(&storage, "s@x.com").await;
        let outsider = create_user(&storage, "o@x.com").await;
        let app = test::init_service(
            App::new()
                .app_data(storage_data(&storage))
                .configure(configure_classes_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/class/management")
            .insert_header(bearer(teacher))
            .set_json(json!({"name": "Geo", "title": "Geography", "subject": "Earth"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let json: Value = test::read_body_json(res).await;
        assert_eq!(json["message"], "Create a class Geo successfully");
        assert_eq!(json["data"]["owner"], teacher);
        let class_id = json["data"]["id"].as_i64().unwrap();

        join_as_student(&storage, student, class_id, "G-1").await;

        let req = test::TestRequest::get()
            .uri(&format!("/class/users?class_id={class_id}"))
            .insert_header(bearer(student))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let json: Value = test::read_body_json(res).await;
        assert_eq!(json["data"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri(&format!("/class/users?classId={class_id}"))
            .insert_header(bearer(outsider))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri("/class/user-classes")
            .insert_header(bearer(teacher))
            .to_request();
        let res = test::call_service(&app, req).await;
        let json: Value = test::read_body_json(res).await;
        assert_eq!(json["data"][0]["role"], "teacher");
        assert_eq!(json["data"][0]["creator"], "User t@x.com");
    }

    #[actix_web::test]
    async fn test_grade_routes_follow_class_roles() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@x.com").await;
        let student = create_user(&storage, "s@x.com").await;
        let class = storage
            .create_class(
                teacher,
                CreateClassRequest {
                    name: "Chem".to_string(),
                    title: "Chem".to_string(),
                    description: None,
                    subject: None,
                },
            )
            .await
            .unwrap();
        join_as_student(&storage, student, class.id, "C-1").await;
        let app = test::init_service(
            App::new()
                .app_data(storage_data(&storage))
                .configure(configure_classes_routes),
        )
        .await;

        // 学生不能创建成绩组成
        let req = test::TestRequest::post()
            .uri(&format!("/class/grades?class_id={}", class.id))
            .insert_header(bearer(student))
            .set_json(json!({"name": "Lab", "weight": 20}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri(&format!("/class/grades?class_id={}", class.id))
            .insert_header(bearer(teacher))
            .set_json(json!({"name": "Lab", "weight": 20}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let json: Value = test::read_body_json(res).await;
        let grade_id = json["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/class/grades/student?class_id={}", class.id))
            .insert_header(bearer(teacher))
            .set_json(json!({"gradeId": grade_id, "studentId": "C-1", "grade": 8.25}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri(&format!("/class/grades/me?class_id={}", class.id))
            .insert_header(bearer(student))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let json: Value = test::read_body_json(res).await;
        assert_eq!(json["data"][0]["grade"], 8.25);
        assert_eq!(json["data"][0]["name"], "Lab");
    }

    #[actix_web::test]
    async fn test_invite_round_trip_over_http() {
        let storage = memory_storage().await;
        let teacher = create_user(&storage, "t@x.com").await;
        let newcomer = create_user(&storage, "n@x.com").await;
        let class = storage
            .create_class(
                teacher,
                CreateClassRequest {
                    name: "Lit".to_string(),
                    title: "Literature".to_string(),
                    description: None,
                    subject: None,
                },
            )
            .await
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(storage_data(&storage))
                .configure(configure_classes_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/class/invite")
            .insert_header(bearer(teacher))
            .set_json(json!({"classId": class.id}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let json: Value = test::read_body_json(res).await;
        let token = json["data"]["token"].as_str().unwrap().to_string();
        assert!(json["data"]["link"].as_str().unwrap().contains("/class/join?"));

        let req = test::TestRequest::post()
            .uri("/class/verify-invite")
            .insert_header(bearer(newcomer))
            .set_json(json!({"token": token, "classId": class.id}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let json: Value = test::read_body_json(res).await;
        assert_eq!(json["data"]["isSuccess"], true);

        let req = test::TestRequest::get()
            .uri(&format!("/class/role?class_id={}", class.id))
            .insert_header(bearer(newcomer))
            .to_request();
        let res = test::call_service(&app, req).await;
        let json: Value = test::read_body_json(res).await;
        assert_eq!(json["data"]["role"], "student");
        assert_eq!(json["data"]["studentId"], Value::Null);
    }
}
