use serde::Serialize;
use ts_rs::TS;

// 学生查看自己的成绩：每个成绩组成一行，未登记的得分为空
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct MyGradeItem {
    pub grade_id: i64,
    pub name: String,
    pub weight: i32,
    pub position: i32,
    pub grade: Option<f64>,
}
