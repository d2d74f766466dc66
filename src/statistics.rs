//! Aggregate reports over the employee/department join.
//!
//! Each report is its own query; nothing is cached between calls.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType, Order, QueryOrder,
    QuerySelect, RelationTrait, Statement,
    sea_query::{Alias, Expr, SimpleExpr},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::{department, employee};
use crate::errors::ApiError;
use crate::messages;

/// Salary bucket labels in reporting order.
pub const SALARY_BUCKETS: [&str; 3] = ["0-50000", "50001-100000", "100000+"];

const SALARY_RANGE: &str = "salary_range";

#[derive(Clone, Debug, PartialEq, Serialize, FromQueryResult, ToSchema)]
pub struct DepartmentHighestSalary {
    pub department: String,
    /// `null` for a department without employees.
    #[serde(with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub salary: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, FromQueryResult, ToSchema)]
pub struct SalaryRangeCount {
    #[serde(rename = "range")]
    pub salary_range: String,
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct YoungestEmployee {
    pub department: String,
    pub name: Option<String>,
    pub age: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    pub department_highest_salary: Vec<DepartmentHighestSalary>,
    pub salary_range_count: Vec<SalaryRangeCount>,
    pub youngest_by_department: Vec<YoungestEmployee>,
}

/// Runs all three reports. `today` is the reference date for ages.
pub async fn employee_stats<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
) -> Result<EmployeeStats, ApiError> {
    let fail = |err| ApiError::storage(messages::employees::STATS_FAILED, err);
    Ok(EmployeeStats {
        department_highest_salary: highest_salary_by_department(db).await.map_err(fail)?,
        salary_range_count: salary_range_counts(db).await.map_err(fail)?,
        youngest_by_department: youngest_by_department(db, today).await.map_err(fail)?,
    })
}

/// Every department with its top salary, highest first and empty
/// departments last; ties keep department id order.
pub async fn highest_salary_by_department<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<DepartmentHighestSalary>, DbErr> {
    let max_salary = Expr::col((employee::Entity, employee::Column::Salary)).max();
    department::Entity::find()
        .select_only()
        .column_as(department::Column::Name, "department")
        .column_as(max_salary.clone(), "salary")
        .join(JoinType::LeftJoin, department::Relation::Employee.def())
        .group_by(department::Column::Id)
        .group_by(department::Column::Name)
        .order_by(Expr::expr(max_salary.clone()).is_null(), Order::Asc)
        .order_by(max_salary, Order::Desc)
        .order_by_asc(department::Column::Id)
        .into_model::<DepartmentHighestSalary>()
        .all(db)
        .await
}

/// `CASE WHEN salary <= 50000 THEN '0-50000' WHEN salary <= 100000 THEN
/// '50001-100000' ELSE '100000+' END`
fn salary_bucket_expr() -> SimpleExpr {
    let salary = || Expr::col((employee::Entity, employee::Column::Salary));
    Expr::case(salary().lte(50_000), SALARY_BUCKETS[0])
        .case(salary().lte(100_000), SALARY_BUCKETS[1])
        .finally(SALARY_BUCKETS[2])
        .into()
}

/// Head counts per salary bucket. Empty buckets are left out; the rest come
/// back in [`SALARY_BUCKETS`] order.
pub async fn salary_range_counts<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<SalaryRangeCount>, DbErr> {
    let mut rows = employee::Entity::find()
        .select_only()
        .column_as(salary_bucket_expr(), SALARY_RANGE)
        .column_as(
            Expr::col((employee::Entity, employee::Column::Id)).count(),
            "count",
        )
        .group_by(Expr::col(Alias::new(SALARY_RANGE)))
        .into_model::<SalaryRangeCount>()
        .all(db)
        .await?;
    rows.sort_by_key(|row| bucket_rank(&row.salary_range));
    Ok(rows)
}

fn bucket_rank(label: &str) -> usize {
    SALARY_BUCKETS
        .iter()
        .position(|l| *l == label)
        .unwrap_or(SALARY_BUCKETS.len())
}

#[derive(Debug, FromQueryResult)]
struct YoungestRow {
    department: String,
    name: Option<String>,
    dob: Option<NaiveDate>,
}

/// The most recently born employee of each department, lowest id on a tie.
/// Departments without employees appear with no name or age.
const YOUNGEST_SQL: &str = r"
SELECT d.name AS department, r.name AS name, r.dob AS dob
FROM departments d
LEFT JOIN (
    SELECT e.department_id, e.name, e.dob,
           ROW_NUMBER() OVER (PARTITION BY e.department_id ORDER BY e.dob DESC, e.id ASC) AS rn
    FROM employees e
) r ON r.department_id = d.id AND r.rn = 1
ORDER BY d.name ASC, d.id ASC";

pub async fn youngest_by_department<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
) -> Result<Vec<YoungestEmployee>, DbErr> {
    let statement = Statement::from_string(db.get_database_backend(), YOUNGEST_SQL);
    let rows = YoungestRow::find_by_statement(statement).all(db).await?;
    Ok(rows
        .into_iter()
        .map(|row| YoungestEmployee {
            department: row.department,
            name: row.name,
            age: row.dob.map(|dob| age_on(dob, today)),
        })
        .collect())
}

/// Whole years from `dob` to `today`, counting a birthday only once it has
/// been reached. A `dob` after `today` is 0.
#[must_use]
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(dob).unwrap_or(0)
}
