use serde::Serialize;
use ts_rs::TS;

use super::entities::Class;
use crate::models::class_users::entities::ClassUserRole;

// 创建班级响应
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassResponse {
    pub id: i64,
    pub owner: i64,
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub subject: Option<String>,
}

impl From<Class> for ClassResponse {
    fn from(class: Class) -> Self {
        Self {
            id: class.id,
            owner: class.owner_id,
            name: class.name,
            title: class.title,
            description: class.description,
            subject: class.subject,
        }
    }
}

// 班级成员（含用户资料）
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassMember {
    pub user_id: i64,
    pub fullname: String,
    pub email: String,
    pub img_url: Option<String>,
    pub role: ClassUserRole,
    pub student_id: Option<String>,
}

// 用户所在班级
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct UserClassItem {
    pub id: i64,
    pub title: String,
    pub name: String,
    pub owner: i64,
    /// 创建者姓名
    pub creator: String,
    /// 创建者头像
    pub avatar: Option<String>,
    pub role: ClassUserRole,
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct ClassRoleResponse {
    pub class_id: i64,
    pub role: ClassUserRole,
    pub student_id: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct InviteLinkResponse {
    pub link: String,
    pub token: String,
}

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct VerifyInviteResponse {
    pub is_success: bool,
}
