//! Database migrations

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_departments;
mod m20250101_000002_create_employees;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_departments::Migration),
            Box::new(m20250101_000002_create_employees::Migration),
        ]
    }
}
