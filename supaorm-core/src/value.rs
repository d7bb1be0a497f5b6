//! Filter values and their query-string rendering

use std::fmt::{self, Display};

/// A value on the right-hand side of a filter expression
///
/// Values are interpolated as text; arrays render as a parenthesized,
/// comma-joined list (`(1,2,3)`) as the `in` operator expects.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 32-bit integer
    I32(i32),
    /// 64-bit integer
    I64(i64),
    /// Unsigned 64-bit integer
    U64(u64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// String value
    String(String),
    /// JSON value
    Json(serde_json::Value),
    /// Array of values
    Array(Vec<Value>),
}

impl Value {
    /// Whether this is `Value::Null`, which renders as `null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extract array values if this is an Array variant
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I32(n) => write!(f, "{}", n),
            Value::I64(n) => write!(f, "{}", n),
            Value::U64(n) => write!(f, "{}", n),
            Value::F32(n) => write!(f, "{}", n),
            Value::F64(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            // bare strings go out unquoted, like every other textual value
            Value::Json(serde_json::Value::String(s)) => f.write_str(s),
            Value::Json(json) => write!(f, "{}", json),
            Value::Array(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
        }
    }
}

// Implement From for common types
impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

impl From<i32> for Value {
    fn from(val: i32) -> Self {
        Value::I32(val)
    }
}

impl From<i64> for Value {
    fn from(val: i64) -> Self {
        Value::I64(val)
    }
}

impl From<u32> for Value {
    fn from(val: u32) -> Self {
        Value::U64(val.into())
    }
}

impl From<u64> for Value {
    fn from(val: u64) -> Self {
        Value::U64(val)
    }
}

impl From<usize> for Value {
    fn from(val: usize) -> Self {
        Value::U64(val as u64)
    }
}

impl From<f32> for Value {
    fn from(val: f32) -> Self {
        Value::F32(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::F64(val)
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::String(val)
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_string())
    }
}

impl From<&String> for Value {
    fn from(val: &String) -> Self {
        Value::String(val.clone())
    }
}

impl From<serde_json::Value> for Value {
    fn from(val: serde_json::Value) -> Self {
        Value::Json(val)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(val: Option<T>) -> Self {
        val.map_or(Value::Null, Into::into)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(vals: Vec<T>) -> Self {
        Value::Array(vals.into_iter().map(|v| v.into()).collect())
    }
}

impl<T> From<&[T]> for Value
where
    T: Clone + Into<Value>,
{
    fn from(vals: &[T]) -> Self {
        Value::Array(vals.iter().cloned().map(|v| v.into()).collect())
    }
}

impl<T, const N: usize> From<[T; N]> for Value
where
    T: Into<Value>,
{
    fn from(vals: [T; N]) -> Self {
        Value::Array(vals.into_iter().map(|v| v.into()).collect())
    }
}

#[cfg(feature = "uuid-support")]
impl From<uuid::Uuid> for Value {
    fn from(val: uuid::Uuid) -> Self {
        Value::String(val.to_string())
    }
}

#[cfg(feature = "datetime-support")]
impl<Tz> From<chrono::DateTime<Tz>> for Value
where
    Tz: chrono::TimeZone,
    Tz::Offset: Display,
{
    fn from(val: chrono::DateTime<Tz>) -> Self {
        Value::String(val.to_rfc3339())
    }
}

#[cfg(feature = "datetime-support")]
impl From<chrono::NaiveDate> for Value {
    fn from(val: chrono::NaiveDate) -> Self {
        Value::String(val.to_string())
    }
}

#[cfg(feature = "decimal-support")]
impl From<rust_decimal::Decimal> for Value {
    fn from(val: rust_decimal::Decimal) -> Self {
        Value::String(val.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(Value::from(18).to_string(), "18");
        assert_eq!(Value::from(-3i64).to_string(), "-3");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from("John").to_string(), "John");
        assert_eq!(Value::from(()).to_string(), "null");
    }

    #[test]
    fn test_array_rendering() {
        assert_eq!(Value::from(vec![1, 2, 3]).to_string(), "(1,2,3)");
        assert_eq!(Value::from(["guest", "banned"]).to_string(), "(guest,banned)");
        assert_eq!(Value::from(Vec::<i32>::new()).to_string(), "()");
    }

    #[test]
    fn test_option_conversion() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
    }

    #[test]
    fn test_json_rendering() {
        assert_eq!(Value::from(serde_json::json!("plain")).to_string(), "plain");
        assert_eq!(Value::from(serde_json::json!({"a": 1})).to_string(), r#"{"a":1}"#);
    }

    #[test]
    fn test_as_array() {
        let value = Value::from(&[1, 2][..]);
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert!(Value::from(1).as_array().is_none());
    }
}
