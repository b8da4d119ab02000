use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::errors::{GradebookError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    class_users::{
        entities::{ClassUser, ClassUserRole},
        requests::NewClassUser,
    },
    classes::{requests::AddUserToClassRequest, responses::ClassRoleResponse},
    users::entities::{User, UserRole},
};
use crate::storage::Storage;

pub async fn handle_add_user_to_class(
    service: &ClassService,
    request: &HttpRequest,
    body: AddUserToClassRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;

    let member = add_user_to_class(&storage, &user, body).await?;
    Ok(ApiResponse::created(member, "Add user to class successfully").into_response())
}

pub async fn handle_list_class_users(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let members = storage.list_class_members(class_id).await?;
    Ok(ApiResponse::success(members, "Success").into_response())
}

pub async fn handle_list_user_classes(
    service: &ClassService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;
    let classes = storage.list_user_classes(user.id).await?;
    Ok(ApiResponse::success(classes, "Successfully").into_response())
}

pub async fn handle_get_class_role(
    service: &ClassService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;
    let role = get_class_role(&storage, class_id, user.id).await?;
    Ok(ApiResponse::success(role, "Successfully").into_response())
}

/// 教师（或管理员）向班级添加成员
pub async fn add_user_to_class(
    storage: &Arc<dyn Storage>,
    requester: &User,
    body: AddUserToClassRequest,
) -> Result<ClassUser> {
    if storage.get_class_by_id(body.class_id).await?.is_none() {
        return Err(GradebookError::not_found("Class not found"));
    }

    if requester.role != UserRole::Admin {
        let is_teacher = storage
            .get_class_user(requester.id, body.class_id)
            .await?
            .is_some_and(|m| m.is_teacher());
        if !is_teacher {
            return Err(GradebookError::authorization(
                "Only teachers of this class can add members",
            ));
        }
    }

    if storage.get_user_by_id(body.user_id).await?.is_none() {
        return Err(GradebookError::not_found("User not found"));
    }

    let student_id = body
        .student_id
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    if let Some(student_id) = &student_id
        && body.role == ClassUserRole::Student
        && storage
            .get_class_user_by_student_id(body.class_id, student_id)
            .await?
            .is_some()
    {
        return Err(GradebookError::conflict("Student ID is already used in this class"));
    }

    let member = storage
        .add_class_user(NewClassUser {
            user_id: body.user_id,
            class_id: body.class_id,
            role: body.role,
            student_id,
        })
        .await?;
    info!(
        "User {} added to class {} as {}",
        member.user_id, member.class_id, member.role
    );
    Ok(member)
}

/// 当前用户在班级中的角色
pub async fn get_class_role(
    storage: &Arc<dyn Storage>,
    class_id: i64,
    user_id: i64,
) -> Result<ClassRoleResponse> {
    let member = storage
        .get_class_user(user_id, class_id)
        .await?
        .ok_or_else(|| GradebookError::not_found("You are not a member of this class"))?;

    Ok(ClassRoleResponse {
        class_id,
        role: member.role,
        student_id: member.student_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classes::requests::CreateClassRequest;
    use crate::services::testing::{create_user, memory_storage};

    async fn setup() -> (Arc<dyn Storage>, User, i64) {
        let storage = memory_storage().await;
        let teacher_id = create_user(&storage, "t@x.com").await;
        let teacher = storage.get_user_by_id(teacher_id).await.unwrap().unwrap();
        let class = storage
            .create_class(
                teacher_id,
                CreateClassRequest {
                    name: "Physics".to_string(),
                    title: "Physics 101".to_string(),
                    description: None,
                    subject: None,
                },
            )
            .await
            .unwrap();
        (storage, teacher, class.id)
    }

    fn add(user_id: i64, class_id: i64, student_id: Option<&str>) -> AddUserToClassRequest {
        AddUserToClassRequest {
            user_id,
            class_id,
            role: ClassUserRole::Student,
            student_id: student_id.map(str::to_string),
        }
    }

    #[actix_web::test]
    async fn test_teacher_adds_student_once() {
        let (storage, teacher, class_id) = setup().await;
        let student = create_user(&storage, "s@x.com").await;

        let member = add_user_to_class(&storage, &teacher, add(student, class_id, Some("S01")))
            .await
            .unwrap();
        assert_eq!(member.student_id.as_deref(), Some("S01"));

        let err = add_user_to_class(&storage, &teacher, add(student, class_id, None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E013");

        let role = get_class_role(&storage, class_id, student).await.unwrap();
        assert_eq!(role.role, ClassUserRole::Student);
        assert_eq!(storage.list_class_members(class_id).await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_student_cannot_add_members() {
        let (storage, teacher, class_id) = setup().await;
        let student_id = create_user(&storage, "s@x.com").await;
        let other = create_user(&storage, "o@x.com").await;
        add_user_to_class(&storage, &teacher, add(student_id, class_id, Some("S01")))
            .await
            .unwrap();

        let student = storage.get_user_by_id(student_id).await.unwrap().unwrap();
        let err = add_user_to_class(&storage, &student, add(other, class_id, None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E011");
    }

    #[actix_web::test]
    async fn test_student_id_unique_within_class() {
        let (storage, teacher, class_id) = setup().await;
        let a = create_user(&storage, "a@x.com").await;
        let b = create_user(&storage, "b@x.com").await;
        add_user_to_class(&storage, &teacher, add(a, class_id, Some("S01")))
            .await
            .unwrap();

        let err = add_user_to_class(&storage, &teacher, add(b, class_id, Some(" S01 ")))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GradebookError::conflict("Student ID is already used in this class")
        );
    }

    #[actix_web::test]
    async fn test_role_of_non_member_is_not_found() {
        let (storage, _, class_id) = setup().await;
        let outsider = create_user(&storage, "x@x.com").await;
        let err = get_class_role(&storage, class_id, outsider).await.unwrap_err();
        assert_eq!(err.code(), "E012");
    }
}
