use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub enum NotificationType {
    ReviewComment, // 复查有新评论
    ReviewFinal,   // 复查已出最终成绩
    System,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::ReviewComment => write!(f, "review_comment"),
            NotificationType::ReviewFinal => write!(f, "review_final"),
            NotificationType::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "review_comment" => Ok(NotificationType::ReviewComment),
            "review_final" => Ok(NotificationType::ReviewFinal),
            "system" => Ok(NotificationType::System),
            _ => Err(format!("Invalid notification type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct Notification {
    pub id: i64,
    /// 接收者
    pub user_id: i64,
    pub class_id: Option<i64>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub content: String,
    pub content_url: Option<String>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
