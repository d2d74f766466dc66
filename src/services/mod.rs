//! Business operations over the entity store, independent of HTTP.

pub mod department;
pub mod employee;

use serde::Serialize;
use utoipa::ToSchema;

/// Payload of a successful delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct DeletedRecord {
    pub id: i32,
}
