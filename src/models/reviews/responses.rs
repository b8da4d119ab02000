use serde::Serialize;
use ts_rs::TS;

use super::entities::{Comment, Review};
use crate::models::grades::entities::StudentComposition;

// 教师查看的复查列表项
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct ReviewListItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub review: Review,
    pub student_id: String,
}

// 评论及评论者资料
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct CommentResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub comment: Comment,
    pub fullname: String,
    pub img_url: Option<String>,
}

// 最终成绩确定结果
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct FinalizeResponse {
    pub student_composition: StudentComposition,
    /// 存在待处理复查时，返回已确定的复查
    pub review: Option<Review>,
}
