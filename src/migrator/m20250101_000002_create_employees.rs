use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Secondary indexes the list filters rely on.
const INDEXES: [(&str, Employees); 3] = [
    ("idx_employee_department", Employees::DepartmentId),
    ("idx_employee_status", Employees::Status),
    ("idx_employee_email", Employees::Email),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(pk_auto(Employees::Id))
                    .col(integer(Employees::DepartmentId))
                    .col(string_len(Employees::Name, 100))
                    .col(date(Employees::Dob))
                    .col(string_len(Employees::Phone, 20))
                    .col(string_len_null(Employees::Photo, 255))
                    .col(string_len_uniq(Employees::Email, 100))
                    .col(decimal_len(Employees::Salary, 10, 2))
                    .col(string_len(Employees::Status, 16).default("active"))
                    .col(
                        timestamp_with_time_zone(Employees::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Employees::ModifiedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employees_department_id")
                            .from(Employees::Table, Employees::DepartmentId)
                            .to(Departments::Table, Departments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Employees::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Employees::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum Employees {
    Table,
    Id,
    DepartmentId,
    Name,
    Dob,
    Phone,
    Photo,
    Email,
    Salary,
    Status,
    CreatedAt,
    ModifiedAt,
}

#[derive(DeriveIden)]
enum Departments {
    Table,
    Id,
}
