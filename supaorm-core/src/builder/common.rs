//! Common types and traits shared by the query builder

use crate::Operator;
use std::fmt;

/// Trait for types that can be converted to column lists
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(|s| s.to_string()).collect()
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

impl IntoColumns for &[&str] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl<const N: usize> IntoColumns for [&str; N] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoColumns for (&str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string()]
    }
}

impl IntoColumns for (&str, &str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string(), self.2.to_string()]
    }
}

impl IntoColumns for (&str, &str, &str, &str) {
    fn into_columns(self) -> Vec<String> {
        vec![
            self.0.to_string(),
            self.1.to_string(),
            self.2.to_string(),
            self.3.to_string(),
        ]
    }
}

/// Sort direction for the `order` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
    AscNullsFirst,
    AscNullsLast,
    DescNullsFirst,
    DescNullsLast,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
            SortDirection::AscNullsFirst => write!(f, "asc.nullsfirst"),
            SortDirection::AscNullsLast => write!(f, "asc.nullslast"),
            SortDirection::DescNullsFirst => write!(f, "desc.nullsfirst"),
            SortDirection::DescNullsLast => write!(f, "desc.nullslast"),
        }
    }
}

/// Trait for values accepted as an order direction
///
/// Plain strings are taken verbatim so callers can pass any qualifier
/// chain the server understands.
pub trait IntoDirection {
    fn into_direction(self) -> String;
}

impl IntoDirection for SortDirection {
    fn into_direction(self) -> String {
        self.to_string()
    }
}

impl IntoDirection for &str {
    fn into_direction(self) -> String {
        self.to_string()
    }
}

impl IntoDirection for String {
    fn into_direction(self) -> String {
        self
    }
}

/// Row-count strategy requested through the `Prefer` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountMode {
    #[default]
    Exact,
    Planned,
    Estimated,
}

impl fmt::Display for CountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountMode::Exact => write!(f, "exact"),
            CountMode::Planned => write!(f, "planned"),
            CountMode::Estimated => write!(f, "estimated"),
        }
    }
}

/// A join against a related resource
///
/// Only the foreign table reaches the request, as an embedded
/// `foreign_table(*)` projection; the column pair and operator are kept for
/// callers that inspect the builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub foreign_table: String,
    pub local_column: String,
    pub operator: Operator,
    pub foreign_column: String,
}

impl Join {
    /// The embedded-resource projection appended to `select`
    pub fn projection(&self) -> String {
        format!("{}(*)", self.foreign_table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_columns() {
        assert_eq!("*".into_columns(), vec!["*"]);
        assert_eq!(("id", "name").into_columns(), vec!["id", "name"]);
        assert_eq!(["id", "name", "email"].into_columns(), vec!["id", "name", "email"]);
        assert_eq!(vec!["id".to_string()].into_columns(), vec!["id"]);
    }

    #[test]
    fn test_sort_direction_display() {
        assert_eq!(SortDirection::Asc.to_string(), "asc");
        assert_eq!(SortDirection::DescNullsLast.to_string(), "desc.nullslast");
        assert_eq!("asc.nullsfirst".into_direction(), "asc.nullsfirst");
    }

    #[test]
    fn test_count_mode_display() {
        assert_eq!(CountMode::default().to_string(), "exact");
        assert_eq!(CountMode::Planned.to_string(), "planned");
        assert_eq!(CountMode::Estimated.to_string(), "estimated");
    }

    #[test]
    fn test_join_projection() {
        let join = Join {
            foreign_table: "posts".to_string(),
            local_column: "id".to_string(),
            operator: Operator::EQ,
            foreign_column: "user_id".to_string(),
        };
        assert_eq!(join.projection(), "posts(*)");
    }
}
