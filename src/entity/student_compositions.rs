//! 学生成绩实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_compositions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub grade_id: i64,
    pub student_id: String,
    pub grade: f64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::grade_compositions::Entity",
        from = "Column::GradeId",
        to = "super::grade_compositions::Column::Id"
    )]
    GradeComposition,
    #[sea_orm(has_one = "super::review_compositions::Entity")]
    ReviewComposition,
}

impl Related<super::grade_compositions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GradeComposition.def()
    }
}

impl Related<super::review_compositions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReviewComposition.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_student_composition(self) -> crate::models::grades::entities::StudentComposition {
        crate::models::grades::entities::StudentComposition {
            id: self.id,
            class_id: self.class_id,
            grade_id: self.grade_id,
            student_id: self.student_id,
            grade: self.grade,
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
