use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One seat per (student, course). The unique index is the arbiter
        // under concurrent enrollment; the service pre-check only improves
        // the error message.
        manager
            .create_index(
                Index::create()
                    .name("idx-seats-student-course-unique")
                    .table(Seats::Table)
                    .col(Seats::StudentId)
                    .col(Seats::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-seats-course_id")
                    .table(Seats::Table)
                    .col(Seats::CourseId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-courses-professor_id")
                    .table(Courses::Table)
                    .col(Courses::ProfessorId)
                    .to_owned(),
            )
            .await?;

        // An account backs at most one profile. NULLs are exempt, so
        // unlinked persons coexist freely.
        manager
            .create_index(
                Index::create()
                    .name("idx-persons-user_id")
                    .table(Persons::Table)
                    .col(Persons::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-seats-student-course-unique")
                    .table(Seats::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-seats-course_id")
                    .table(Seats::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-courses-professor_id")
                    .table(Courses::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-persons-user_id")
                    .table(Persons::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Seats {
    Table,
    StudentId,
    CourseId,
}

#[derive(Iden)]
enum Courses {
    Table,
    ProfessorId,
}

#[derive(Iden)]
enum Persons {
    Table,
    UserId,
}
