use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 成绩组成（班级的一个计分项，如“期中考试”）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct GradeComposition {
    pub id: i64,
    pub class_id: i64,
    pub name: String,
    /// 百分比权重
    pub weight: i32,
    /// 展示顺序
    pub position: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 某个学生在某个成绩组成上的得分
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/grade.ts")]
pub struct StudentComposition {
    pub id: i64,
    pub class_id: i64,
    pub grade_id: i64,
    /// 学号
    pub student_id: String,
    pub grade: f64,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
