use async_trait::async_trait;
use sea_orm::{ActiveValue, ColumnTrait, Condition, DatabaseConnection, DbErr};
use serde::{Deserialize, Deserializer};

use crate::filter::PredicateSet;

pub trait MergeIntoActiveModel<ActiveModelType> {
    fn merge_into_activemodel(self, existing: ActiveModelType) -> Result<ActiveModelType, DbErr>;
}

/// A row type served by a filtered, paginated list endpoint.
///
/// Implementors describe how their filters become predicates and how to run
/// the count and data queries. Both queries receive the same condition, so
/// `total` always describes the rows a page is drawn from.
#[async_trait]
pub trait ListResource: Sized + Send + Sync {
    type Column: ColumnTrait + Send + Sync;
    type Filters: Send + Sync;

    const RESOURCE_NAME_PLURAL: &'static str;

    fn predicates(filters: &Self::Filters) -> PredicateSet<Self::Column>;

    async fn total_count(db: &DatabaseConnection, condition: &Condition) -> Result<u64, DbErr>;

    /// Rows `offset..offset + limit`, newest (highest id) first.
    async fn fetch_page(
        db: &DatabaseConnection,
        condition: &Condition,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Self>, DbErr>;
}

/// A field of a partial update: either left alone or replaced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Patch<T> {
    Unset,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> Patch<T> {
    #[must_use]
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Patch<U>, E> {
        match self {
            Self::Unset => Ok(Patch::Unset),
            Self::Set(v) => f(v).map(Patch::Set),
        }
    }

    /// Writes a `Set` value into the active model field; `Unset` leaves it.
    pub fn apply_to(self, field: &mut ActiveValue<T>)
    where
        T: Into<sea_orm::Value>,
    {
        if let Self::Set(v) = self {
            *field = ActiveValue::Set(v);
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unset, Self::Set)
    }
}

/// A present key is always `Set`; pair with `#[serde(default)]` so an
/// absent key stays `Unset`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self::Set)
    }
}
