use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct CreateReviewRequest {
    pub grade_id: i64,
    pub expected_grade: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct PostCommentRequest {
    pub grade_id: i64,
    pub review_id: i64,
    pub content: String,
}

// 教师确定最终成绩
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct FinalizeReviewRequest {
    pub grade_id: i64,
    pub student_id: String,
    pub final_grade: f64,
}

// 复查相关查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewQuery {
    #[serde(alias = "classId")]
    pub class_id: i64,
    #[serde(default, alias = "gradeId")]
    pub grade_id: Option<i64>,
    #[serde(default, alias = "reviewId")]
    pub review_id: Option<i64>,
}
