//! 成绩复查实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "review_compositions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 每条学生成绩最多一条复查
    #[sea_orm(unique)]
    pub student_composition_id: i64,
    pub grade_id: i64,
    pub current_grade: f64,
    pub expected_grade: f64,
    pub explanation: String,
    pub status: String,
    pub final_grade: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student_compositions::Entity",
        from = "Column::StudentCompositionId",
        to = "super::student_compositions::Column::Id"
    )]
    StudentComposition,
    #[sea_orm(has_many = "super::comment_reviews::Entity")]
    CommentReviews,
}

impl Related<super::student_compositions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentComposition.def()
    }
}

impl Related<super::comment_reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CommentReviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_review(self) -> crate::models::reviews::entities::Review {
        use crate::models::reviews::entities::{Review, ReviewStatus};

        Review {
            id: self.id,
            student_composition_id: self.student_composition_id,
            grade_id: self.grade_id,
            current_grade: self.current_grade,
            expected_grade: self.expected_grade,
            explanation: self.explanation,
            status: self
                .status
                .parse::<ReviewStatus>()
                .unwrap_or(ReviewStatus::Pending),
            final_grade: self.final_grade,
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
