use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 班级内角色
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/class-user.ts")]
pub enum ClassUserRole {
    Student, // 学生
    Teacher, // 教师
}

impl ClassUserRole {
    pub const STUDENT: &'static str = "student";
    pub const TEACHER: &'static str = "teacher";

    pub fn all_roles() -> &'static [&'static ClassUserRole] {
        &[&Self::Student, &Self::Teacher]
    }
}

impl<'de> Deserialize<'de> for ClassUserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<ClassUserRole>().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for ClassUserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassUserRole::Student => write!(f, "{}", ClassUserRole::STUDENT),
            ClassUserRole::Teacher => write!(f, "{}", ClassUserRole::TEACHER),
        }
    }
}

impl std::str::FromStr for ClassUserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ClassUserRole::STUDENT => Ok(ClassUserRole::Student),
            ClassUserRole::TEACHER => Ok(ClassUserRole::Teacher),
            _ => Err(format!(
                "Invalid class role: '{s}'. Supported roles: student, teacher"
            )),
        }
    }
}

// 班级成员关系
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/class-user.ts")]
pub struct ClassUser {
    pub id: i64,
    pub class_id: i64,
    pub user_id: i64,
    pub role: ClassUserRole,
    /// 学号，成绩按学号登记
    pub student_id: Option<String>,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

impl ClassUser {
    pub fn is_teacher(&self) -> bool {
        self.role == ClassUserRole::Teacher
    }
}
