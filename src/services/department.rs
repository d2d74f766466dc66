//! Department reads and writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, IntoActiveModel, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{Status, department, employee};
use crate::errors::ApiError;
use crate::filter::PredicateSet;
use crate::messages;
use crate::models::CommonFilters;
use crate::pagination::{Page, PageRequest, paginate};
use crate::traits::{ListResource, MergeIntoActiveModel, Patch};
use crate::validation::{ValidationErrors, validators};

use super::DeletedRecord;

/// A department as stored.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct Department {
    pub id: i32,
    pub name: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<department::Model> for Department {
    fn from(model: department::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            status: model.status,
            created_at: model.created_at,
            modified_at: model.modified_at,
        }
    }
}

/// A department with the number of employees referencing it.
#[derive(Clone, Debug, PartialEq, Serialize, FromQueryResult, ToSchema)]
pub struct DepartmentSummary {
    pub id: i32,
    pub name: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub employee_count: i64,
}

/// Departments joined to their employees and grouped back to one row each.
fn summary_select() -> Select<department::Entity> {
    department::Entity::find()
        .column_as(
            Expr::col((employee::Entity, employee::Column::Id)).count(),
            "employee_count",
        )
        .join(JoinType::LeftJoin, department::Relation::Employee.def())
        .group_by(department::Column::Id)
        .group_by(department::Column::Name)
        .group_by(department::Column::Status)
        .group_by(department::Column::CreatedAt)
        .group_by(department::Column::ModifiedAt)
}

#[async_trait]
impl ListResource for DepartmentSummary {
    type Column = department::Column;
    type Filters = CommonFilters;

    const RESOURCE_NAME_PLURAL: &'static str = "departments";

    fn predicates(filters: &CommonFilters) -> PredicateSet<department::Column> {
        PredicateSet::new()
            .equals_opt(department::Column::Status, filters.status)
            .contains_opt([department::Column::Name], filters.search.as_deref())
    }

    async fn total_count(db: &DatabaseConnection, condition: &Condition) -> Result<u64, DbErr> {
        department::Entity::find()
            .filter(condition.clone())
            .count(db)
            .await
    }

    async fn fetch_page(
        db: &DatabaseConnection,
        condition: &Condition,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr> {
        summary_select()
            .filter(condition.clone())
            .order_by_desc(department::Column::Id)
            .offset(offset)
            .limit(limit)
            .into_model::<Self>()
            .all(db)
            .await
    }
}

/// Create payload as submitted.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DepartmentPayload {
    #[schema(example = "Engineering")]
    pub name: Option<String>,
    /// Defaults to `active`.
    #[schema(example = "active")]
    pub status: Option<String>,
}

/// Update payload as submitted. Absent keys are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DepartmentUpdatePayload {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub status: Patch<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewDepartment {
    pub name: String,
    pub status: Status,
}

impl TryFrom<DepartmentPayload> for NewDepartment {
    type Error = ValidationErrors;

    fn try_from(payload: DepartmentPayload) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.check(
            validators::validate_required("name", "Name", payload.name.as_deref())
                .and_then(validators::validate_name),
        );
        let status = match payload.status.as_deref().map(str::trim) {
            None | Some("") => Some(Status::default()),
            Some(raw) => errors.check(validators::validate_status(raw)),
        };
        match (name, status) {
            (Some(name), Some(status)) if errors.is_empty() => Ok(Self { name, status }),
            _ => Err(errors),
        }
    }
}

impl From<NewDepartment> for department::ActiveModel {
    fn from(new: NewDepartment) -> Self {
        Self {
            name: Set(new.name),
            status: Set(new.status),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DepartmentPatch {
    pub name: Patch<String>,
    pub status: Patch<Status>,
}

impl DepartmentPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.name.is_set() && !self.status.is_set()
    }
}

impl TryFrom<DepartmentUpdatePayload> for DepartmentPatch {
    type Error = ValidationErrors;

    fn try_from(payload: DepartmentUpdatePayload) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.check(payload.name.try_map(|n| validators::validate_name(&n)));
        let status = errors.check(payload.status.try_map(|s| validators::validate_status(&s)));
        match (name, status) {
            (Some(name), Some(status)) if errors.is_empty() => Ok(Self { name, status }),
            _ => Err(errors),
        }
    }
}

impl MergeIntoActiveModel<department::ActiveModel> for DepartmentPatch {
    fn merge_into_activemodel(
        self,
        mut existing: department::ActiveModel,
    ) -> Result<department::ActiveModel, DbErr> {
        self.name.apply_to(&mut existing.name);
        self.status.apply_to(&mut existing.status);
        Ok(existing)
    }
}

pub async fn list(
    db: &DatabaseConnection,
    filters: &CommonFilters,
    request: PageRequest,
) -> Result<Page<DepartmentSummary>, ApiError> {
    paginate::<DepartmentSummary>(db, filters, request).await
}

pub async fn find(db: &DatabaseConnection, id: i32) -> Result<DepartmentSummary, ApiError> {
    summary_select()
        .filter(department::Column::Id.eq(id))
        .into_model::<DepartmentSummary>()
        .one(db)
        .await
        .map_err(|err| ApiError::storage(messages::DATABASE_ERROR, err))?
        .ok_or_else(|| ApiError::not_found("Department"))
}

pub async fn create(db: &DatabaseConnection, new: NewDepartment) -> Result<Department, ApiError> {
    let model = department::ActiveModel::from(new)
        .insert(db)
        .await
        .map_err(|err| ApiError::storage(messages::DATABASE_ERROR, err))?;
    tracing::info!(id = model.id, name = %model.name, "department created");
    Ok(model.into())
}

pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    patch: DepartmentPatch,
) -> Result<Department, ApiError> {
    let existing = department::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|err| ApiError::storage(messages::DATABASE_ERROR, err))?
        .ok_or_else(|| ApiError::not_found("Department"))?;

    if patch.is_empty() {
        return Err(ApiError::integrity(messages::NOTHING_TO_UPDATE));
    }

    let active = patch.merge_into_activemodel(existing.into_active_model())?;
    let model = active
        .update(db)
        .await
        .map_err(|err| ApiError::storage(messages::DATABASE_ERROR, err))?;
    tracing::info!(id, "department updated");
    Ok(model.into())
}

/// Deletes the row only; employees still referencing it make the database
/// reject the delete.
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<DeletedRecord, ApiError> {
    let result = department::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|err| ApiError::storage(messages::DATABASE_ERROR, err))?;
    if result.rows_affected == 0 {
        return Err(ApiError::not_found("Department"));
    }
    tracing::info!(id, "department deleted");
    Ok(DeletedRecord { id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn create_defaults_status_to_active() {
        let new = NewDepartment::try_from(DepartmentPayload {
            name: Some(" Engineering ".into()),
            status: None,
        })
        .unwrap();
        assert_eq!(
            new,
            NewDepartment {
                name: "Engineering".into(),
                status: Status::Active
            }
        );
    }

    #[test]
    fn create_requires_name() {
        let errors = NewDepartment::try_from(DepartmentPayload::default()).unwrap_err();
        assert_eq!(errors.errors()[0].message, "Name is required");
    }

    #[test]
    fn create_rejects_bad_status() {
        let errors = NewDepartment::try_from(DepartmentPayload {
            name: Some("Sales".into()),
            status: Some("closed".into()),
        })
        .unwrap_err();
        assert_eq!(errors.errors().len(), 1);
    }

    #[test]
    fn empty_update_payload_is_empty_patch() {
        let payload: DepartmentUpdatePayload = serde_json::from_str("{}").unwrap();
        let patch = DepartmentPatch::try_from(payload).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn status_only_update_leaves_name_unset() {
        let payload: DepartmentUpdatePayload =
            serde_json::from_str(r#"{"status":"inactive"}"#).unwrap();
        let patch = DepartmentPatch::try_from(payload).unwrap();
        assert_eq!(patch.name, Patch::Unset);
        assert_eq!(patch.status, Patch::Set(Status::Inactive));
    }

    #[test]
    fn summary_query_counts_through_left_join() {
        let sql = summary_select().build(DbBackend::Sqlite).to_string();
        assert!(sql.contains(r#"COUNT("employees"."id") AS "employee_count""#), "{sql}");
        assert!(sql.contains("LEFT JOIN \"employees\""), "{sql}");
        assert!(sql.contains("GROUP BY"), "{sql}");
    }
}
