use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::GradeService;
use crate::errors::{GradebookError, Result};
use crate::models::{
    ApiResponse,
    grades::{entities::GradeComposition, requests::CreateGradeCompositionRequest},
};
use crate::storage::Storage;

pub async fn handle_create(
    service: &GradeService,
    request: &HttpRequest,
    class_id: i64,
    body: CreateGradeCompositionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let grade = create_grade_composition(&storage, class_id, body).await?;
    Ok(ApiResponse::created(grade, "Create grade composition successfully").into_response())
}

pub async fn handle_list(
    service: &GradeService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let grades = storage.list_grade_compositions(class_id).await?;
    Ok(ApiResponse::success(grades, "Successfully").into_response())
}

pub async fn create_grade_composition(
    storage: &Arc<dyn Storage>,
    class_id: i64,
    mut body: CreateGradeCompositionRequest,
) -> Result<GradeComposition> {
    body.name = body.name.trim().to_string();
    if body.name.is_empty() {
        return Err(GradebookError::validation("Grade composition name is required"));
    }
    if !(0..=100).contains(&body.weight) {
        return Err(GradebookError::validation("Weight must be between 0 and 100"));
    }
    if body.position.is_some_and(|p| p < 0) {
        return Err(GradebookError::validation("Position must not be negative"));
    }

    let grade = storage.create_grade_composition(class_id, body).await?;
    info!("Grade composition {} created in class {}", grade.id, class_id);
    Ok(grade)
}
