//! 测试数据构造

use super::SeaOrmStorage;
use crate::models::{
    class_users::{entities::ClassUserRole, requests::NewClassUser},
    classes::{entities::Class, requests::CreateClassRequest},
    grades::{entities::GradeComposition, requests::CreateGradeCompositionRequest},
    users::{entities::UserRole, requests::CreateUserRequest},
};

pub(crate) async fn seed_user(storage: &SeaOrmStorage, email: &str) -> i64 {
    storage
        .create_user_impl(CreateUserRequest {
            email: email.to_string(),
            fullname: format!("User {email}"),
            password_hash: None,
            img_url: Some(format!("https://img/{email}")),
            facebook_id: None,
            google_id: None,
            role: UserRole::User,
            is_verified: true,
        })
        .await
        .unwrap()
        .id
}

pub(crate) async fn seed_class(storage: &SeaOrmStorage, owner_id: i64, name: &str) -> Class {
    storage
        .create_class_impl(
            owner_id,
            CreateClassRequest {
                name: name.to_string(),
                title: format!("{name} title"),
                description: None,
                subject: None,
            },
        )
        .await
        .unwrap()
}

pub(crate) async fn enroll_student(
    storage: &SeaOrmStorage,
    user_id: i64,
    class_id: i64,
    student_id: &str,
) {
    storage
        .add_class_user_impl(NewClassUser {
            user_id,
            class_id,
            role: ClassUserRole::Student,
            student_id: Some(student_id.to_string()),
        })
        .await
        .unwrap();
}

pub(crate) async fn seed_grade(
    storage: &SeaOrmStorage,
    class_id: i64,
    name: &str,
) -> GradeComposition {
    storage
        .create_grade_composition_impl(
            class_id,
            CreateGradeCompositionRequest {
                name: name.to_string(),
                weight: 30,
                position: None,
            },
        )
        .await
        .unwrap()
}
