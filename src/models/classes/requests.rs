use serde::Deserialize;
use ts_rs::TS;

use crate::models::class_users::entities::ClassUserRole;

// 创建班级请求
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct CreateClassRequest {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub subject: Option<String>,
}

// 教师向班级添加成员
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct AddUserToClassRequest {
    pub user_id: i64,
    pub class_id: i64,
    pub role: ClassUserRole,
    pub student_id: Option<String>,
}

// `?class_id=` 查询参数，兼容 `classId`
#[derive(Debug, Clone, Deserialize)]
pub struct ClassIdQuery {
    #[serde(alias = "classId")]
    pub class_id: i64,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct InviteRequest {
    pub class_id: i64,
}

// 通过邀请链接加入班级，学号由教师之后登记
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/class.ts")]
pub struct VerifyInviteRequest {
    pub token: String,
    pub class_id: i64,
}
