pub mod compositions;
pub mod scores;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{GradebookError, Result};
use crate::models::grades::{
    entities::GradeComposition,
    requests::{CreateGradeCompositionRequest, SetStudentGradeRequest},
};
use crate::storage::Storage;

pub struct GradeService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradeService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn create_grade_composition(
        &self,
        request: &HttpRequest,
        class_id: i64,
        body: CreateGradeCompositionRequest,
    ) -> ActixResult<HttpResponse> {
        compositions::handle_create(self, request, class_id, body).await
    }

    pub async fn list_grade_compositions(
        &self,
        request: &HttpRequest,
        class_id: i64,
    ) -> ActixResult<HttpResponse> {
        compositions::handle_list(self, request, class_id).await
    }

    // 登记学生成绩
    pub async fn set_student_grade(
        &self,
        request: &HttpRequest,
        class_id: i64,
        body: SetStudentGradeRequest,
    ) -> ActixResult<HttpResponse> {
        scores::handle_set_student_grade(self, request, class_id, body).await
    }

    // 学生查看自己的成绩
    pub async fn my_grades(&self, request: &HttpRequest, class_id: i64) -> ActixResult<HttpResponse> {
        scores::handle_my_grades(self, request, class_id).await
    }
}

/// 确认成绩组成属于该班级
///
/// 组成不存在或属于其他班级都返回 404，不暴露其他班级的数据。
pub async fn check_grade_in_class(
    storage: &Arc<dyn Storage>,
    class_id: i64,
    grade_id: i64,
) -> Result<GradeComposition> {
    storage
        .get_grade_composition(grade_id)
        .await?
        .filter(|grade| grade.class_id == class_id)
        .ok_or_else(|| GradebookError::not_found("Grade composition not found in this class"))
}
