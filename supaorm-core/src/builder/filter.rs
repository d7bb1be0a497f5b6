//! Grouped and negated filter descriptors

use crate::{Operator, Value};

/// Logical connector of a grouped filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupConnector {
    And,
    Or,
}

impl GroupConnector {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupConnector::And => "and",
            GroupConnector::Or => "or",
        }
    }
}

/// Pre-formatted filters joined under one `or=(...)` / `and=(...)` parameter
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedFilter {
    pub connector: GroupConnector,
    pub filters: Vec<String>,
}

impl GroupedFilter {
    /// `or=(f1,f2,...)`
    pub fn expression(&self) -> String {
        let (key, value) = self.query_pair();
        format!("{}={}", key, value)
    }

    pub fn query_pair(&self) -> (String, String) {
        (
            self.connector.as_str().to_string(),
            format!("({})", self.filters.join(",")),
        )
    }
}

/// A negated column filter, sent as `column=not.operator.value`
#[derive(Debug, Clone, PartialEq)]
pub struct NegatedFilter {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

impl NegatedFilter {
    pub fn expression(&self) -> String {
        let (key, value) = self.query_pair();
        format!("{}={}", key, value)
    }

    pub fn query_pair(&self) -> (String, String) {
        (
            self.column.clone(),
            format!("not.{}.{}", self.operator, self.value),
        )
    }
}
