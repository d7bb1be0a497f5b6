//! Query builder module

pub mod common;
pub mod filter;
pub mod query;

// Re-export types from submodules
pub use common::{CountMode, IntoColumns, IntoDirection, Join, SortDirection};
pub use filter::{GroupConnector, GroupedFilter, NegatedFilter};
pub use query::{QueryBuilder, RAW_QUERY_PROCEDURE, SINGLE_OBJECT_ACCEPT};
