//! Employee reads and writes, including the photo lifecycle.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, FromQueryResult, IntoActiveModel, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select,
};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::entities::{Status, department, employee};
use crate::errors::ApiError;
use crate::filter::PredicateSet;
use crate::integrity::{
    classify_employee_write_error, ensure_department_exists, ensure_email_available,
};
use crate::messages;
use crate::models::CommonFilters;
use crate::pagination::{Page, PageRequest, paginate};
use crate::photo::{PhotoStore, PhotoUpload, resolve_photo_url};
use crate::traits::{ListResource, MergeIntoActiveModel, Patch};
use crate::validation::{ValidationErrors, validators};

use super::DeletedRecord;

/// An employee row joined with its department's name, as read from storage.
#[derive(Clone, Debug, PartialEq, FromQueryResult)]
pub struct EmployeeRecord {
    pub id: i32,
    pub department_id: i32,
    pub name: String,
    pub dob: NaiveDate,
    pub phone: String,
    pub photo: Option<String>,
    pub email: String,
    pub salary: Decimal,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub department_name: Option<String>,
}

/// An employee as returned to clients. `photo` is a URL, never a filename.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct Employee {
    pub id: i32,
    pub department_id: i32,
    pub department_name: Option<String>,
    pub name: String,
    pub dob: NaiveDate,
    pub phone: String,
    #[schema(example = "/uploads/1718000000000-3f2a9c.png")]
    pub photo: Option<String>,
    pub email: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub salary: Decimal,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<EmployeeRecord> for Employee {
    fn from(record: EmployeeRecord) -> Self {
        Self {
            photo: resolve_photo_url(record.photo.as_deref()),
            id: record.id,
            department_id: record.department_id,
            department_name: record.department_name,
            name: record.name,
            dob: record.dob,
            phone: record.phone,
            email: record.email,
            salary: record.salary,
            status: record.status,
            created_at: record.created_at,
            modified_at: record.modified_at,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeFilters {
    pub common: CommonFilters,
    pub department: Option<i32>,
}

fn record_select() -> Select<employee::Entity> {
    employee::Entity::find()
        .column_as(department::Column::Name, "department_name")
        .join(JoinType::LeftJoin, employee::Relation::Department.def())
}

#[async_trait]
impl ListResource for EmployeeRecord {
    type Column = employee::Column;
    type Filters = EmployeeFilters;

    const RESOURCE_NAME_PLURAL: &'static str = "employees";

    fn predicates(filters: &EmployeeFilters) -> PredicateSet<employee::Column> {
        PredicateSet::new()
            .equals_opt(employee::Column::Status, filters.common.status)
            .equals_opt(employee::Column::DepartmentId, filters.department)
            .contains_opt(
                [employee::Column::Name, employee::Column::Email],
                filters.common.search.as_deref(),
            )
    }

    async fn total_count(db: &DatabaseConnection, condition: &Condition) -> Result<u64, DbErr> {
        employee::Entity::find()
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
        record_select()
            .filter(condition.clone())
            .order_by_desc(employee::Column::Id)
            .offset(offset)
            .limit(limit)
            .into_model::<Self>()
            .all(db)
            .await
    }
}

/// Multipart text fields of an employee form, keyed by field name.
pub type FormFields = HashMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEmployee {
    pub department_id: i32,
    pub name: String,
    pub dob: NaiveDate,
    pub phone: String,
    pub email: String,
    pub salary: Decimal,
    pub status: Status,
}

impl NewEmployee {
    /// Every field is required. `today` bounds the date of birth.
    pub fn from_form(fields: &FormFields, today: NaiveDate) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let field = |key: &str| fields.get(key).map(String::as_str);

        let department_id = errors.check(
            validators::validate_required("department_id", "Department ID", field("department_id"))
                .and_then(validators::validate_department_id),
        );
        let name = errors.check(
            validators::validate_required("name", "Name", field("name"))
                .and_then(validators::validate_name),
        );
        let dob = errors.check(
            validators::validate_required("dob", "Date of birth", field("dob"))
                .and_then(|v| validators::validate_dob(v, today)),
        );
        let phone = errors.check(
            validators::validate_required("phone", "Phone number", field("phone"))
                .and_then(validators::validate_phone),
        );
        let email = errors.check(
            validators::validate_required("email", "Email", field("email"))
                .and_then(validators::validate_email),
        );
        let salary = errors.check(
            validators::validate_required("salary", "Salary", field("salary"))
                .and_then(validators::validate_salary),
        );
        let status = errors.check(
            validators::validate_required("status", "Status", field("status"))
                .and_then(validators::validate_status),
        );

        match (department_id, name, dob, phone, email, salary, status) {
            (
                Some(department_id),
                Some(name),
                Some(dob),
                Some(phone),
                Some(email),
                Some(salary),
                Some(status),
            ) => Ok(Self {
                department_id,
                name,
                dob,
                phone,
                email,
                salary,
                status,
            }),
            _ => Err(errors),
        }
    }
}

impl From<NewEmployee> for employee::ActiveModel {
    fn from(new: NewEmployee) -> Self {
        Self {
            department_id: Set(new.department_id),
            name: Set(new.name),
            dob: Set(new.dob),
            phone: Set(new.phone),
            email: Set(new.email),
            salary: Set(new.salary),
            status: Set(new.status),
            photo: Set(None),
            ..Default::default()
        }
    }
}

/// Partial employee update. Email is not updatable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeePatch {
    pub department_id: Patch<i32>,
    pub name: Patch<String>,
    pub dob: Patch<NaiveDate>,
    pub phone: Patch<String>,
    pub salary: Patch<Decimal>,
    pub status: Patch<Status>,
}

impl EmployeePatch {
    /// Only submitted fields become `Set`; an `email` field is ignored.
    pub fn from_form(fields: &FormFields, today: NaiveDate) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let field = |key: &str| Patch::from(fields.get(key).map(String::as_str));

        let department_id =
            errors.check(field("department_id").try_map(validators::validate_department_id));
        let name = errors.check(field("name").try_map(validators::validate_name));
        let dob = errors.check(field("dob").try_map(|v| validators::validate_dob(v, today)));
        let phone = errors.check(field("phone").try_map(validators::validate_phone));
        let salary = errors.check(field("salary").try_map(validators::validate_salary));
        let status = errors.check(field("status").try_map(validators::validate_status));

        match (department_id, name, dob, phone, salary, status) {
            (
                Some(department_id),
                Some(name),
                Some(dob),
                Some(phone),
                Some(salary),
                Some(status),
            ) => Ok(Self {
                department_id,
                name,
                dob,
                phone,
                salary,
                status,
            }),
            _ => Err(errors),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.department_id.is_set()
            || self.name.is_set()
            || self.dob.is_set()
            || self.phone.is_set()
            || self.salary.is_set()
            || self.status.is_set())
    }
}

impl MergeIntoActiveModel<employee::ActiveModel> for EmployeePatch {
    fn merge_into_activemodel(
        self,
        mut existing: employee::ActiveModel,
    ) -> Result<employee::ActiveModel, DbErr> {
        self.department_id.apply_to(&mut existing.department_id);
        self.name.apply_to(&mut existing.name);
        self.dob.apply_to(&mut existing.dob);
        self.phone.apply_to(&mut existing.phone);
        self.salary.apply_to(&mut existing.salary);
        self.status.apply_to(&mut existing.status);
        Ok(existing)
    }
}

pub async fn list(
    db: &DatabaseConnection,
    filters: &EmployeeFilters,
    request: PageRequest,
) -> Result<Page<Employee>, ApiError> {
    Ok(paginate::<EmployeeRecord>(db, filters, request)
        .await?
        .map(Employee::from))
}

pub async fn find(db: &DatabaseConnection, id: i32) -> Result<Employee, ApiError> {
    record_select()
        .filter(employee::Column::Id.eq(id))
        .into_model::<EmployeeRecord>()
        .one(db)
        .await
        .map_err(|err| ApiError::storage(messages::DATABASE_ERROR, err))?
        .map(Employee::from)
        .ok_or_else(|| ApiError::not_found("Employee"))
}

/// Checks email and department, stores the photo, then inserts. A failed
/// insert takes the freshly stored photo with it.
pub async fn create(
    db: &DatabaseConnection,
    photos: &dyn PhotoStore,
    new: NewEmployee,
    photo: Option<PhotoUpload>,
) -> Result<Employee, ApiError> {
    ensure_email_available(db, &new.email).await?;
    ensure_department_exists(db, new.department_id).await?;

    let stored = store_photo(photos, photo.as_ref()).await?;
    let mut active = employee::ActiveModel::from(new);
    active.photo = Set(stored.clone());

    let model = match active.insert(db).await {
        Ok(model) => model,
        Err(err) => {
            discard_photo(photos, stored.as_deref()).await;
            return Err(classify_employee_write_error(err, messages::DATABASE_ERROR));
        }
    };
    tracing::info!(id = model.id, department_id = model.department_id, "employee created");

    find(db, model.id).await
}

/// Applies the patch and, when a new photo is supplied, swaps it in and
/// removes the previous file once the row is updated.
pub async fn update(
    db: &DatabaseConnection,
    photos: &dyn PhotoStore,
    id: i32,
    patch: EmployeePatch,
    photo: Option<PhotoUpload>,
) -> Result<Employee, ApiError> {
    let existing = employee::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|err| ApiError::storage(messages::DATABASE_ERROR, err))?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    if patch.is_empty() && photo.is_none() {
        return Err(ApiError::integrity(messages::NOTHING_TO_UPDATE));
    }
    if let Patch::Set(department_id) = patch.department_id {
        ensure_department_exists(db, department_id).await?;
    }

    let previous_photo = existing.photo.clone();
    let stored = store_photo(photos, photo.as_ref()).await?;

    let mut active = patch.merge_into_activemodel(existing.into_active_model())?;
    if stored.is_some() {
        active.photo = Set(stored.clone());
    }

    if let Err(err) = active.update(db).await {
        discard_photo(photos, stored.as_deref()).await;
        return Err(classify_employee_write_error(err, messages::DATABASE_ERROR));
    }
    if stored.is_some() {
        discard_photo(photos, previous_photo.as_deref()).await;
    }
    tracing::info!(id, photo_replaced = stored.is_some(), "employee updated");

    find(db, id).await
}

/// Deletes the row, then its photo file.
pub async fn delete(
    db: &DatabaseConnection,
    photos: &dyn PhotoStore,
    id: i32,
) -> Result<DeletedRecord, ApiError> {
    let existing = employee::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|err| ApiError::storage(messages::DATABASE_ERROR, err))?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    employee::Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|err| ApiError::storage(messages::DATABASE_ERROR, err))?;
    discard_photo(photos, existing.photo.as_deref()).await;
    tracing::info!(id, "employee deleted");

    Ok(DeletedRecord { id })
}

async fn store_photo(
    photos: &dyn PhotoStore,
    upload: Option<&PhotoUpload>,
) -> Result<Option<String>, ApiError> {
    let Some(upload) = upload else {
        return Ok(None);
    };
    photos
        .save(upload.filename(), upload.bytes())
        .await
        .map_err(|e| ApiError::internal(messages::PHOTO_STORE_FAILED, Some(e.to_string())))?;
    Ok(Some(upload.filename().to_string()))
}

/// Best effort: a file that cannot be removed is only logged.
async fn discard_photo(photos: &dyn PhotoStore, filename: Option<&str>) {
    let Some(filename) = filename else { return };
    if let Err(err) = photos.remove(filename).await {
        tracing::warn!(filename, error = %err, "failed to remove photo");
    }
}
