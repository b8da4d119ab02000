use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 复查状态：pending -> finalized
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub enum ReviewStatus {
    Pending,
    Finalized,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewStatus::Pending => write!(f, "pending"),
            ReviewStatus::Finalized => write!(f, "finalized"),
        }
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReviewStatus::Pending),
            "finalized" => Ok(ReviewStatus::Finalized),
            _ => Err(format!("Invalid review status: {s}")),
        }
    }
}

// 成绩复查请求
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct Review {
    pub id: i64,
    pub student_composition_id: i64,
    pub grade_id: i64,
    pub current_grade: f64,
    pub expected_grade: f64,
    pub explanation: String,
    pub status: ReviewStatus,
    pub final_grade: Option<f64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 复查评论，创建后不可修改
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/review.ts")]
pub struct Comment {
    pub id: i64,
    pub review_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
