use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).text().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // Create addresses table
        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Addresses::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Addresses::Street).string().not_null())
                    .col(ColumnDef::new(Addresses::City).string().not_null())
                    .col(ColumnDef::new(Addresses::State).string().not_null())
                    .col(ColumnDef::new(Addresses::Country).string().not_null())
                    .to_owned(),
            )
            .await?;

        // Create persons table (single table for all variants, discriminated
        // by `kind`; variant-specific columns are nullable)
        manager
            .create_table(
                Table::create()
                    .table(Persons::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Persons::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Persons::Name).string().not_null())
                    .col(
                        ColumnDef::new(Persons::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Persons::Phone).string())
                    .col(ColumnDef::new(Persons::Kind).text().not_null())
                    .col(ColumnDef::new(Persons::StudentNumber).uuid().unique_key())
                    .col(ColumnDef::new(Persons::Salary).double())
                    .col(ColumnDef::new(Persons::AddressId).uuid())
                    .col(ColumnDef::new(Persons::UserId).uuid())
                    .col(ColumnDef::new(Persons::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Persons::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-persons-address_id")
                            .from(Persons::Table, Persons::AddressId)
                            .to(Addresses::Table, Addresses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-persons-user_id")
                            .from(Persons::Table, Persons::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Courses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Courses::Name).string().not_null())
                    .col(ColumnDef::new(Courses::ProfessorId).uuid().not_null())
                    .col(ColumnDef::new(Courses::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Courses::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-courses-professor_id")
                            .from(Courses::Table, Courses::ProfessorId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Create seats table. Dependent rows are removed by the services
        // inside their own transactions, so both foreign keys restrict
        // instead of cascading.
        manager
            .create_table(
                Table::create()
                    .table(Seats::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Seats::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Seats::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Seats::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Seats::ExamDate).date().not_null())
                    .col(ColumnDef::new(Seats::EvaluationDate).date())
                    .col(ColumnDef::new(Seats::Mark).double())
                    .col(ColumnDef::new(Seats::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Seats::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-seats-student_id")
                            .from(Seats::Table, Seats::StudentId)
                            .to(Persons::Table, Persons::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-seats-course_id")
                            .from(Seats::Table, Seats::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Seats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Persons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Addresses {
    Table,
    Id,
    Street,
    City,
    State,
    Country,
}

#[derive(Iden)]
enum Persons {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Kind,
    StudentNumber,
    Salary,
    AddressId,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
    Name,
    ProfessorId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Seats {
    Table,
    Id,
    StudentId,
    CourseId,
    ExamDate,
    EvaluationDate,
    Mark,
    CreatedAt,
    UpdatedAt,
}
