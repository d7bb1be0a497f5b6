//! PostgREST filter operators and conversions

use std::borrow::Cow;
use std::fmt::{self, Display};

/// A PostgREST filter operator, rendered between column and value
/// (`age.gt.18`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operator(Cow<'static, str>);

impl Operator {
    pub const EQ: Self = Operator(Cow::Borrowed("eq"));
    pub const NEQ: Self = Operator(Cow::Borrowed("neq"));
    pub const GT: Self = Operator(Cow::Borrowed("gt"));
    pub const GTE: Self = Operator(Cow::Borrowed("gte"));
    pub const LT: Self = Operator(Cow::Borrowed("lt"));
    pub const LTE: Self = Operator(Cow::Borrowed("lte"));
    pub const LIKE: Self = Operator(Cow::Borrowed("like"));
    pub const ILIKE: Self = Operator(Cow::Borrowed("ilike"));
    pub const MATCH: Self = Operator(Cow::Borrowed("match"));
    pub const IMATCH: Self = Operator(Cow::Borrowed("imatch"));
    pub const IS: Self = Operator(Cow::Borrowed("is"));
    pub const IN: Self = Operator(Cow::Borrowed("in"));
    pub const CONTAINS: Self = Operator(Cow::Borrowed("cs"));
    pub const CONTAINED_BY: Self = Operator(Cow::Borrowed("cd"));
    pub const OVERLAPS: Self = Operator(Cow::Borrowed("ov"));
    pub const FTS: Self = Operator(Cow::Borrowed("fts"));
    pub const PLFTS: Self = Operator(Cow::Borrowed("plfts"));
    pub const PHFTS: Self = Operator(Cow::Borrowed("phfts"));
    pub const WFTS: Self = Operator(Cow::Borrowed("wfts"));

    /// Create an operator the builder has no constant for
    ///
    /// # Examples
    /// ```
    /// use supaorm_core::Operator;
    ///
    /// // range adjacency
    /// let adj = Operator::custom("adj");
    /// assert_eq!(adj.as_str(), "adj");
    /// ```
    pub fn custom(op: impl Into<Cow<'static, str>>) -> Self {
        Operator(op.into())
    }

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for types that can be converted to filter operators
pub trait IntoOperator {
    fn into_operator(self) -> Operator;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> Operator {
        self
    }
}

impl IntoOperator for &Operator {
    fn into_operator(self) -> Operator {
        self.clone()
    }
}

/// Known names map to the PostgREST spelling, SQL symbols are translated,
/// anything else is passed through untouched.
impl IntoOperator for &str {
    fn into_operator(self) -> Operator {
        match self.to_ascii_lowercase().as_str() {
            "eq" | "=" => Operator::EQ,
            "neq" | "!=" | "<>" => Operator::NEQ,
            "gt" | ">" => Operator::GT,
            "gte" | ">=" => Operator::GTE,
            "lt" | "<" => Operator::LT,
            "lte" | "<=" => Operator::LTE,
            "like" => Operator::LIKE,
            "ilike" => Operator::ILIKE,
            "match" | "~" => Operator::MATCH,
            "imatch" | "~*" => Operator::IMATCH,
            "is" => Operator::IS,
            "in" => Operator::IN,
            "cs" | "@>" => Operator::CONTAINS,
            "cd" | "<@" => Operator::CONTAINED_BY,
            "ov" | "&&" => Operator::OVERLAPS,
            "fts" => Operator::FTS,
            "plfts" => Operator::PLFTS,
            "phfts" => Operator::PHFTS,
            "wfts" => Operator::WFTS,
            _ => Operator::custom(self.to_string()),
        }
    }
}

impl IntoOperator for String {
    fn into_operator(self) -> Operator {
        self.as_str().into_operator()
    }
}

/// Convenience module for operator constants
pub mod op {
    use super::Operator;

    pub const EQ: Operator = Operator::EQ;
    pub const NEQ: Operator = Operator::NEQ;
    pub const GT: Operator = Operator::GT;
    pub const GTE: Operator = Operator::GTE;
    pub const LT: Operator = Operator::LT;
    pub const LTE: Operator = Operator::LTE;
    pub const LIKE: Operator = Operator::LIKE;
    pub const ILIKE: Operator = Operator::ILIKE;
    pub const IS: Operator = Operator::IS;
    pub const IN: Operator = Operator::IN;
    pub const CS: Operator = Operator::CONTAINS;
    pub const CD: Operator = Operator::CONTAINED_BY;
    pub const OV: Operator = Operator::OVERLAPS;
    pub const FTS: Operator = Operator::FTS;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_constants() {
        assert_eq!(Operator::GT.as_str(), "gt");
        assert_eq!(Operator::NEQ.as_str(), "neq");
        assert_eq!(Operator::CONTAINS.as_str(), "cs");
        assert_eq!(op::ILIKE.as_str(), "ilike");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Operator::GTE), "gte");
        assert_eq!(format!("{}", Operator::IN), "in");
    }

    #[test]
    fn test_string_conversion() {
        assert_eq!("gt".into_operator(), Operator::GT);
        assert_eq!("LIKE".into_operator(), Operator::LIKE);
        assert_eq!("Eq".into_operator(), Operator::EQ);
        assert_eq!(String::from("in").into_operator(), Operator::IN);
    }

    #[test]
    fn test_sql_symbols_translate() {
        assert_eq!(">".into_operator(), Operator::GT);
        assert_eq!(">=".into_operator(), Operator::GTE);
        assert_eq!("=".into_operator(), Operator::EQ);
        assert_eq!("<>".into_operator(), Operator::NEQ);
        assert_eq!("@>".into_operator(), Operator::CONTAINS);
    }

    #[test]
    fn test_unknown_operator_passes_through() {
        let op = "adj".into_operator();
        assert_eq!(op, Operator::custom("adj"));
        assert_eq!(op.to_string(), "adj");
    }
}
