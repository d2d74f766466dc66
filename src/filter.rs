//! Predicate composition for list queries.
//!
//! Filters are collected as tagged [`Predicate`] values and rendered into a
//! single Sea-ORM [`Condition`]. Every value ends up as a bound parameter;
//! search terms have their LIKE wildcards escaped so they match literally.

use sea_orm::{
    ColumnTrait, Condition, Value,
    sea_query::{Expr, SimpleExpr},
};

/// Character used in the `ESCAPE` clause of every generated LIKE. It needs
/// no quoting in any backend's string literals.
const LIKE_ESCAPE: char = '!';

/// Both sides go through the database's `UPPER`, so the comparison folds
/// case exactly as far as the backend does.
const UPPER_LIKE_SQL: &str = "UPPER(?) LIKE UPPER(?) ESCAPE '!'";

/// Escapes the LIKE metacharacters `%` and `_`, and the escape character
/// itself.
#[must_use]
pub fn escape_like_wildcards(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Substring pattern for `term`, compared as `UPPER(column) LIKE
/// UPPER(pattern)`.
#[must_use]
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like_wildcards(term))
}

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate<C> {
    /// `column = value`
    Equals { column: C, value: Value },
    /// Case-insensitive substring match of `term` on ANY of `columns`.
    Contains { columns: Vec<C>, term: String },
}

impl<C: ColumnTrait> Predicate<C> {
    pub fn equals(column: C, value: impl Into<Value>) -> Self {
        Self::Equals {
            column,
            value: value.into(),
        }
    }

    pub fn contains(columns: impl IntoIterator<Item = C>, term: impl Into<String>) -> Self {
        Self::Contains {
            columns: columns.into_iter().collect(),
            term: term.into(),
        }
    }

    fn render(&self) -> Condition {
        match self {
            Self::Equals { column, value } => Condition::all().add(column.eq(value.clone())),
            Self::Contains { columns, term } => {
                let pattern = contains_pattern(term);
                columns
                    .iter()
                    .fold(Condition::any(), |any, column| {
                        any.add(upper_like(*column, &pattern))
                    })
            }
        }
    }
}

/// `UPPER(table.column) LIKE UPPER(pattern) ESCAPE '!'`, qualified by table
/// so the same column name on a joined table is never ambiguous.
fn upper_like<C: ColumnTrait>(column: C, pattern: &str) -> SimpleExpr {
    Expr::cust_with_exprs(
        UPPER_LIKE_SQL,
        [
            Expr::col((column.entity_name(), column)).into(),
            Expr::val(pattern).into(),
        ],
    )
}

/// Conjunction of predicates. An empty set matches every row.
#[derive(Clone, Debug, PartialEq)]
pub struct PredicateSet<C> {
    predicates: Vec<Predicate<C>>,
}

impl<C> Default for PredicateSet<C> {
    fn default() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }
}

impl<C: ColumnTrait> PredicateSet<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, predicate: Predicate<C>) {
        self.predicates.push(predicate);
    }

    /// Adds `column = value` when `value` is present.
    #[must_use]
    pub fn equals_opt<V: Into<Value>>(mut self, column: C, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.push(Predicate::equals(column, value));
        }
        self
    }

    /// Adds a substring search across `columns` when `term` is present and
    /// not blank.
    #[must_use]
    pub fn contains_opt(mut self, columns: impl IntoIterator<Item = C>, term: Option<&str>) -> Self {
        if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
            self.push(Predicate::contains(columns, term));
        }
        self
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate<C>] {
        &self.predicates
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    #[must_use]
    pub fn into_condition(self) -> Condition {
        self.predicates
            .iter()
            .fold(Condition::all(), |all, p| all.add(p.render()))
    }
}
