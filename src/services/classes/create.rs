use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::errors::{GradebookError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    classes::{requests::CreateClassRequest, responses::ClassResponse},
};
use crate::storage::Storage;

pub async fn handle_create_class(
    service: &ClassService,
    request: &HttpRequest,
    class_data: CreateClassRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;

    let class = create_class(&storage, user.id, class_data).await?;
    let message = format!("Create a class {} successfully", class.name);
    Ok(ApiResponse::created(class, message).into_response())
}

/// 创建班级，创建者同时成为该班级的教师
pub async fn create_class(
    storage: &Arc<dyn Storage>,
    owner_id: i64,
    mut class_data: CreateClassRequest,
) -> Result<ClassResponse> {
    class_data.name = class_data.name.trim().to_string();
    class_data.title = class_data.title.trim().to_string();
    if class_data.name.is_empty() || class_data.title.is_empty() {
        return Err(GradebookError::validation("Class name and title are required"));
    }

    let class = storage.create_class(owner_id, class_data).await?;
    info!("Class {} created by user {}", class.id, owner_id);
    Ok(ClassResponse::from(class))
}
