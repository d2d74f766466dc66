/*!
# Index Analysis Module

Startup audit of the secondary indexes the list filters and joins rely on.
The live schema is inspected per backend and every required index whose
column is not covered produces a recommendation, logged with suggested DDL.
*/

use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement};
use std::collections::HashSet;

/// An index the service expects to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredIndex {
    pub name: &'static str,
    pub table: &'static str,
    pub column: &'static str,
    pub priority: Priority,
    pub reason: &'static str,
}

pub const REQUIRED_INDEXES: [RequiredIndex; 4] = [
    RequiredIndex {
        name: "idx_employee_department",
        table: "employees",
        column: "department_id",
        priority: Priority::High,
        reason: "joined by every department count and filtered by department",
    },
    RequiredIndex {
        name: "idx_employee_status",
        table: "employees",
        column: "status",
        priority: Priority::Medium,
        reason: "filtered by the employee status filter",
    },
    RequiredIndex {
        name: "idx_employee_email",
        table: "employees",
        column: "email",
        priority: Priority::High,
        reason: "looked up by the duplicate email check",
    },
    RequiredIndex {
        name: "idx_department_status",
        table: "departments",
        column: "status",
        priority: Priority::Medium,
        reason: "filtered by the department status filter",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecommendation {
    pub table_name: String,
    pub column_name: String,
    pub reason: String,
    pub priority: Priority,
    pub suggested_sql: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Medium,
    High,
}

#[derive(Debug)]
struct ExistingIndex {
    column_name: String,
}

/// Compare [`REQUIRED_INDEXES`] against the live schema.
///
/// # Errors
///
/// Returns a `DbErr` if the catalog queries fail.
pub async fn analyze_indexes<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<IndexRecommendation>, DbErr> {
    let backend = db.get_database_backend();
    let mut recommendations = Vec::new();

    let tables: HashSet<&str> = REQUIRED_INDEXES.iter().map(|i| i.table).collect();
    let mut tables: Vec<&str> = tables.into_iter().collect();
    tables.sort_unstable();

    for table in tables {
        let indexed: HashSet<String> = get_existing_indexes(db, table, backend)
            .await?
            .into_iter()
            .map(|idx| idx.column_name)
            .collect();

        for required in REQUIRED_INDEXES.iter().filter(|i| i.table == table) {
            if !indexed.contains(required.column) {
                recommendations.push(IndexRecommendation {
                    table_name: table.to_string(),
                    column_name: required.column.to_string(),
                    reason: format!("Column '{}' is {}", required.column, required.reason),
                    priority: required.priority,
                    suggested_sql: generate_btree_index_sql(required),
                });
            }
        }
    }

    recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
    Ok(recommendations)
}

/// Log each missing index as a warning.
pub fn display_index_recommendations(recommendations: &[IndexRecommendation]) {
    if recommendations.is_empty() {
        tracing::debug!("all required indexes present");
        return;
    }
    for rec in recommendations {
        tracing::warn!(
            table = %rec.table_name,
            column = %rec.column_name,
            priority = ?rec.priority,
            suggested_sql = %rec.suggested_sql,
            "missing index: {}",
            rec.reason
        );
    }
}

/// Runs the audit and logs the outcome. An audit that cannot run is logged
/// and otherwise ignored.
pub async fn audit_indexes<C: ConnectionTrait>(db: &C) -> Vec<IndexRecommendation> {
    match analyze_indexes(db).await {
        Ok(recommendations) => {
            display_index_recommendations(&recommendations);
            recommendations
        }
        Err(err) => {
            tracing::warn!(error = %err, "index audit failed");
            Vec::new()
        }
    }
}

async fn get_existing_indexes<C: ConnectionTrait>(
    db: &C,
    table_name: &str,
    backend: DatabaseBackend,
) -> Result<Vec<ExistingIndex>, DbErr> {
    let query = match backend {
        DatabaseBackend::Sqlite => return get_sqlite_indexes(db, table_name).await,
        DatabaseBackend::Postgres => {
            format!(
                r"
                SELECT a.attname as column_name
                FROM pg_class t
                JOIN pg_index ix ON t.oid = ix.indrelid
                JOIN pg_class i ON i.oid = ix.indexrelid
                JOIN pg_attribute a ON t.oid = a.attrelid AND a.attnum = ANY(ix.indkey)
                WHERE t.relname = '{table_name}'
                AND t.relkind = 'r'
                "
            )
        }
        DatabaseBackend::MySql => {
            format!(
                r"
                SELECT COLUMN_NAME as column_name
                FROM information_schema.statistics
                WHERE TABLE_NAME = '{table_name}'
                AND TABLE_SCHEMA = DATABASE()
                "
            )
        }
    };

    let rows = db.query_all(Statement::from_string(backend, query)).await?;
    rows.into_iter()
        .map(|row| {
            Ok(ExistingIndex {
                column_name: row.try_get("", "column_name")?,
            })
        })
        .collect()
}

/// `SQLite` has no catalog view; walk `PRAGMA index_list` and `index_info`.
async fn get_sqlite_indexes<C: ConnectionTrait>(
    db: &C,
    table_name: &str,
) -> Result<Vec<ExistingIndex>, DbErr> {
    let mut indexes = Vec::new();

    let index_list = Statement::from_string(
        DatabaseBackend::Sqlite,
        format!("PRAGMA index_list({table_name})"),
    );
    for row in db.query_all(index_list).await? {
        let index_name: String = row.try_get("", "name")?;
        let index_info = Statement::from_string(
            DatabaseBackend::Sqlite,
            format!("PRAGMA index_info(\"{index_name}\")"),
        );
        for info in db.query_all(index_info).await? {
            indexes.push(ExistingIndex {
                column_name: info.try_get("", "name")?,
            });
        }
    }

    Ok(indexes)
}

fn generate_btree_index_sql(index: &RequiredIndex) -> String {
    format!(
        "CREATE INDEX {} ON {} ({});",
        index.name, index.table, index.column
    )
}
