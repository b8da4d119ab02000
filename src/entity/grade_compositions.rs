//! 成绩组成实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "grade_compositions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: i64,
    pub name: String,
    pub weight: i32,
    pub position: i32,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
    #[sea_orm(has_many = "super::student_compositions::Entity")]
    StudentCompositions,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl Related<super::student_compositions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentCompositions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_grade_composition(self) -> crate::models::grades::entities::GradeComposition {
        crate::models::grades::entities::GradeComposition {
            id: self.id,
            class_id: self.class_id,
            name: self.name,
            weight: self.weight,
            position: self.position,
            created_at: super::to_datetime(self.created_at),
        }
    }
}
