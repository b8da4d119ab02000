use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_tables::{Classes, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 成绩组成 ====================
        manager
            .create_table(
                Table::create()
                    .table(GradeCompositions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GradeCompositions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GradeCompositions::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GradeCompositions::Name).string().not_null())
                    .col(
                        ColumnDef::new(GradeCompositions::Weight)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GradeCompositions::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GradeCompositions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GradeCompositions::Table, GradeCompositions::ClassId)
                            .to(Classes::Table, Classes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 学生成绩 ====================
        manager
            .create_table(
                Table::create()
                    .table(StudentCompositions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentCompositions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StudentCompositions::ClassId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentCompositions::GradeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentCompositions::StudentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentCompositions::Grade)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StudentCompositions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudentCompositions::Table, StudentCompositions::GradeId)
                            .to(GradeCompositions::Table, GradeCompositions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 成绩复查 ====================
        manager
            .create_table(
                Table::create()
                    .table(ReviewCompositions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReviewCompositions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReviewCompositions::StudentCompositionId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ReviewCompositions::GradeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewCompositions::CurrentGrade)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewCompositions::ExpectedGrade)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewCompositions::Explanation)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewCompositions::Status)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewCompositions::FinalGrade)
                            .double()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReviewCompositions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReviewCompositions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                ReviewCompositions::Table,
                                ReviewCompositions::StudentCompositionId,
                            )
                            .to(StudentCompositions::Table, StudentCompositions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 复查评论 ====================
        manager
            .create_table(
                Table::create()
                    .table(CommentReviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommentReviews::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CommentReviews::ReviewId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CommentReviews::UserId).big_integer().not_null())
                    .col(ColumnDef::new(CommentReviews::Content).text().not_null())
                    .col(
                        ColumnDef::new(CommentReviews::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CommentReviews::Table, CommentReviews::ReviewId)
                            .to(ReviewCompositions::Table, ReviewCompositions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(CommentReviews::Table, CommentReviews::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 通知 ====================
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Notifications::ClassId).big_integer().null())
                    .col(
                        ColumnDef::new(Notifications::NotificationType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Notifications::Content).text().not_null())
                    .col(ColumnDef::new(Notifications::ContentUrl).string().null())
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 索引 ====================
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_grade_compositions_class_id")
                    .table(GradeCompositions::Table)
                    .col(GradeCompositions::ClassId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_student_compositions_grade_student")
                    .table(StudentCompositions::Table)
                    .col(StudentCompositions::GradeId)
                    .col(StudentCompositions::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_review_compositions_grade_id")
                    .table(ReviewCompositions::Table)
                    .col(ReviewCompositions::GradeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_comment_reviews_review_id")
                    .table(CommentReviews::Table)
                    .col(CommentReviews::ReviewId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_user_id")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CommentReviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ReviewCompositions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudentCompositions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GradeCompositions::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum GradeCompositions {
    #[sea_orm(iden = "grade_compositions")]
    Table,
    Id,
    ClassId,
    Name,
    Weight,
    Position,
    CreatedAt,
}

#[derive(DeriveIden)]
enum StudentCompositions {
    #[sea_orm(iden = "student_compositions")]
    Table,
    Id,
    ClassId,
    GradeId,
    StudentId,
    Grade,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ReviewCompositions {
    #[sea_orm(iden = "review_compositions")]
    Table,
    Id,
    StudentCompositionId,
    GradeId,
    CurrentGrade,
    ExpectedGrade,
    Explanation,
    Status,
    FinalGrade,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CommentReviews {
    #[sea_orm(iden = "comment_reviews")]
    Table,
    Id,
    ReviewId,
    UserId,
    Content,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    #[sea_orm(iden = "notifications")]
    Table,
    Id,
    UserId,
    ClassId,
    NotificationType,
    Content,
    ContentUrl,
    IsRead,
    CreatedAt,
}
