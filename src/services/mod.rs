pub mod auth;
pub mod classes;
pub mod grades;
pub mod mail;
pub mod notifications;
pub mod reviews;
pub mod websocket;

pub use auth::AuthService;
pub use classes::ClassService;
pub use grades::GradeService;
pub use notifications::NotificationService;
pub use reviews::ReviewService;

use actix_web::{HttpRequest, web};
use std::sync::Arc;

use crate::errors::{GradebookError, Result};
use crate::storage::Storage;

/// 从 app_data 中取出存储实例
pub(crate) fn storage_from_request(request: &HttpRequest) -> Result<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| GradebookError::configuration("Storage not found in app data"))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::models::class_users::{entities::ClassUserRole, requests::NewClassUser};
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};

    pub(crate) async fn memory_storage() -> Arc<dyn Storage> {
        Arc::new(SeaOrmStorage::connect_in_memory().await.unwrap())
    }

    pub(crate) async fn create_user(storage: &Arc<dyn Storage>, email: &str) -> i64 {
        storage
            .create_user(CreateUserRequest {
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

    pub(crate) async fn join_as_student(
        storage: &Arc<dyn Storage>,
        user_id: i64,
        class_id: i64,
        student_id: &str,
    ) {
        storage
            .add_class_user(NewClassUser {
                user_id,
                class_id,
                role: ClassUserRole::Student,
                student_id: Some(student_id.to_string()),
            })
            .await
            .unwrap();
    }
}
