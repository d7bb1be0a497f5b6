//! supaorm core - a fluent query builder for PostgREST and Supabase REST APIs
//!
//! Chained builder calls accumulate a query; one terminal call serializes it
//! into query parameters and headers, sends a single HTTP request and decodes
//! the JSON response.
//!
//! ```no_run
//! use serde::Deserialize;
//! use supaorm_core::{op, Client};
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! # async fn run() -> supaorm_core::Result<()> {
//! let client = Client::new("https://project.supabase.co", "anon-key");
//! let users: Vec<User> = client
//!     .from("users")
//!     .select(("id", "name"))
//!     .where_("age", op::GT, 18)
//!     .order("name", "asc")
//!     .get()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod operator;
pub mod value;

// Re-export main types
pub use builder::{
    CountMode, GroupConnector, GroupedFilter, IntoColumns, IntoDirection, Join, NegatedFilter,
    QueryBuilder, SortDirection,
};
pub use client::Client;
pub use config::{ClientBuilder, ClientConfig};
pub use error::{Error, Result};
pub use executor::{Method, PreparedRequest, RawResponse};
pub use operator::{op, IntoOperator, Operator};
pub use value::Value;

/// Create a query builder for `table` that is not bound to a client
pub fn table(name: &str) -> QueryBuilder {
    QueryBuilder::new(name)
}
