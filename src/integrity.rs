//! Cross-entity checks run before employee writes.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, SqlErr,
};

use crate::entities::{department, employee};
use crate::errors::ApiError;
use crate::messages;

/// Fails with "Invalid department" unless a department with `id` exists.
pub async fn ensure_department_exists<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<(), ApiError> {
    let found = department::Entity::find_by_id(id)
        .count(db)
        .await
        .map_err(|err| ApiError::storage(messages::DATABASE_ERROR, err))?;
    if found == 0 {
        tracing::debug!(department_id = id, "department does not exist");
        return Err(ApiError::integrity(messages::departments::INVALID));
    }
    Ok(())
}

/// Fails with "Email already exists" if any employee already uses `email`.
pub async fn ensure_email_available<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<(), ApiError> {
    let taken = employee::Entity::find()
        .filter(employee::Column::Email.eq(email))
        .count(db)
        .await
        .map_err(|err| ApiError::storage(messages::DATABASE_ERROR, err))?;
    if taken > 0 {
        tracing::debug!(email, "email already registered");
        return Err(ApiError::integrity(messages::employees::EMAIL_TAKEN));
    }
    Ok(())
}

/// Constraint violations raised by an employee insert or update are the
/// same faults the pre-checks report; anything else is a storage fault.
pub fn classify_employee_write_error(err: DbErr, fallback: &str) -> ApiError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!(%detail, "unique constraint violated on employee write");
            ApiError::integrity(messages::employees::EMAIL_TAKEN)
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            tracing::debug!(%detail, "foreign key violated on employee write");
            ApiError::integrity(messages::departments::INVALID)
        }
        _ => ApiError::storage(fallback, err),
    }
}
