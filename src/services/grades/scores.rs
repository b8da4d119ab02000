use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GradeService, check_grade_in_class};
use crate::errors::{GradebookError, Result};
use crate::middlewares::RequireJWT;
use crate::models::{
    ApiResponse,
    grades::{
        entities::StudentComposition, requests::SetStudentGradeRequest,
        responses::MyGradeItem,
    },
};
use crate::storage::Storage;

pub async fn handle_set_student_grade(
    service: &GradeService,
    request: &HttpRequest,
    class_id: i64,
    body: SetStudentGradeRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let score = set_student_grade(&storage, class_id, body).await?;
    Ok(ApiResponse::success(score, "Update grade successfully").into_response())
}

pub async fn handle_my_grades(
    service: &GradeService,
    request: &HttpRequest,
    class_id: i64,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;
    let grades = my_grades(&storage, class_id, user.id).await?;
    Ok(ApiResponse::success(grades, "Successfully").into_response())
}

/// 登记或修改某个学生在某个成绩组成上的得分
pub async fn set_student_grade(
    storage: &Arc<dyn Storage>,
    class_id: i64,
    body: SetStudentGradeRequest,
) -> Result<StudentComposition> {
    if !body.grade.is_finite() || body.grade < 0.0 {
        return Err(GradebookError::validation("Grade must be a non-negative number"));
    }
    let student_id = body.student_id.trim();
    if student_id.is_empty() {
        return Err(GradebookError::validation("Student ID is required"));
    }
    check_grade_in_class(storage, class_id, body.grade_id).await?;

    let score = storage
        .upsert_student_grade(class_id, body.grade_id, student_id, body.grade)
        .await?;
    info!(
        "Grade {} of student {} set to {}",
        body.grade_id, student_id, body.grade
    );
    Ok(score)
}

/// 学生按学号查看自己的成绩，未登记的组成得分为空
pub async fn my_grades(
    storage: &Arc<dyn Storage>,
    class_id: i64,
    user_id: i64,
) -> Result<Vec<MyGradeItem>> {
    let student_id = storage
        .get_class_user(user_id, class_id)
        .await?
        .and_then(|m| m.student_id)
        .ok_or_else(|| GradebookError::not_found("Student ID not found in this class"))?;

    let compositions = storage.list_grade_compositions(class_id).await?;
    let scores = storage
        .list_student_compositions(class_id, &student_id)
        .await?;

    Ok(compositions
        .into_iter()
        .map(|grade| MyGradeItem {
            grade: scores
                .iter()
                .find(|s| s.grade_id == grade.id)
                .map(|s| s.grade),
            grade_id: grade.id,
            name: grade.name,
            weight: grade.weight,
            position: grade.position,
        })
        .collect())
}
