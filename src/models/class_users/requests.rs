use super::entities::ClassUserRole;

// 新增班级成员（存储层使用）
#[derive(Debug, Clone)]
pub struct NewClassUser {
    pub user_id: i64,
    pub class_id: i64,
    pub role: ClassUserRole,
    pub student_id: Option<String>,
}
