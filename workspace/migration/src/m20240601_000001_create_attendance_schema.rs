use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create class sections table
        manager
            .create_table(
                Table::create()
                    .table(ClassSections::Table)
                    .if_not_exists()
                    .col(pk_auto(ClassSections::Id))
                    .col(string(ClassSections::Name))
                    .to_owned(),
            )
            .await?;

        // Create tracks table
        manager
            .create_table(
                Table::create()
                    .table(Tracks::Table)
                    .if_not_exists()
                    .col(pk_auto(Tracks::Id))
                    .col(string(Tracks::Code))
                    .col(string(Tracks::Name))
                    .to_owned(),
            )
            .await?;

        // Create subjects table
        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(pk_auto(Subjects::Id))
                    .col(string(Subjects::Code).unique_key())
                    .col(string(Subjects::Name))
                    .to_owned(),
            )
            .await?;

        // Create students table
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(pk_auto(Students::Id))
                    .col(string(Students::Nis).unique_key())
                    .col(string(Students::Name))
                    .col(string_null(Students::Sex))
                    .col(integer_null(Students::ClassId))
                    .col(integer_null(Students::TrackId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_class")
                            .from(Students::Table, Students::ClassId)
                            .to(ClassSections::Table, ClassSections::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_track")
                            .from(Students::Table, Students::TrackId)
                            .to(Tracks::Table, Tracks::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create attendance headers table
        manager
            .create_table(
                Table::create()
                    .table(AttendanceHeaders::Table)
                    .if_not_exists()
                    .col(pk_auto(AttendanceHeaders::Id))
                    .col(integer(AttendanceHeaders::ClassId))
                    .col(integer(AttendanceHeaders::TrackId))
                    .col(integer(AttendanceHeaders::SubjectId))
                    .col(date(AttendanceHeaders::Date))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_header_class")
                            .from(AttendanceHeaders::Table, AttendanceHeaders::ClassId)
                            .to(ClassSections::Table, ClassSections::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_header_track")
                            .from(AttendanceHeaders::Table, AttendanceHeaders::TrackId)
                            .to(Tracks::Table, Tracks::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_header_subject")
                            .from(AttendanceHeaders::Table, AttendanceHeaders::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One header per (class, track, subject, date)
        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_header_natural_key")
                    .table(AttendanceHeaders::Table)
                    .col(AttendanceHeaders::ClassId)
                    .col(AttendanceHeaders::TrackId)
                    .col(AttendanceHeaders::SubjectId)
                    .col(AttendanceHeaders::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create attendance lines table
        manager
            .create_table(
                Table::create()
                    .table(AttendanceLines::Table)
                    .if_not_exists()
                    .col(pk_auto(AttendanceLines::Id))
                    .col(integer(AttendanceLines::HeaderId))
                    .col(string(AttendanceLines::Nis))
                    .col(string_len(AttendanceLines::Status, 10))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_line_header")
                            .from(AttendanceLines::Table, AttendanceLines::HeaderId)
                            .to(AttendanceHeaders::Table, AttendanceHeaders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_line_header_nis")
                    .table(AttendanceLines::Table)
                    .col(AttendanceLines::HeaderId)
                    .col(AttendanceLines::Nis)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // History lookups go by NIS across all headers
        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_line_nis")
                    .table(AttendanceLines::Table)
                    .col(AttendanceLines::Nis)
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .col(string(Users::PasswordHash))
                    .col(string_len(Users::Role, 20))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AttendanceLines::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AttendanceHeaders::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Subjects::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Tracks::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ClassSections::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ClassSections {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Tracks {
    Table,
    Id,
    Code,
    Name,
}

#[derive(DeriveIden)]
enum Subjects {
    Table,
    Id,
    Code,
    Name,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    Nis,
    Name,
    Sex,
    ClassId,
    TrackId,
}

#[derive(DeriveIden)]
enum AttendanceHeaders {
    Table,
    Id,
    ClassId,
    TrackId,
    SubjectId,
    Date,
}

#[derive(DeriveIden)]
enum AttendanceLines {
    Table,
    Id,
    HeaderId,
    Nis,
    Status,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
}
