use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct CreateGradeCompositionRequest {
    pub name: String,
    pub weight: i32,
    /// 不填则排在最后
    pub position: Option<i32>,
}

// 登记/修改学生成绩
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct SetStudentGradeRequest {
    pub grade_id: i64,
    pub student_id: String,
    pub grade: f64,
}
