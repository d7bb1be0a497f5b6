//! Table query builder
//!
//! A [`QueryBuilder`] accumulates a query through chained calls and is
//! consumed by exactly one terminal operation, which serializes the state
//! into a single request and performs one round trip.

use super::common::{CountMode, IntoColumns, IntoDirection, Join};
use super::filter::{GroupConnector, GroupedFilter, NegatedFilter};
use crate::executor::{Method, PreparedRequest, RawResponse};
use crate::{Client, ClientConfig, Error, IntoOperator, Operator, Result, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

/// Stored procedure that runs [`QueryBuilder::raw`] SQL
pub const RAW_QUERY_PROCEDURE: &str = "execute_sql";

/// `Accept` value asking for a single object instead of an array
pub const SINGLE_OBJECT_ACCEPT: &str = "application/vnd.pgrst.object+json";

const PREFER: &str = "Prefer";

/// Builder for one query against one table
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table_name: String,
    select_columns: Option<String>,
    filters: Vec<String>,
    grouped_filters: Vec<GroupedFilter>,
    negated_filters: Vec<NegatedFilter>,
    order_clause: Option<(String, String)>,
    limit_value: Option<u64>,
    offset_value: Option<u64>,
    range_value: Option<(u64, u64)>,
    count_mode: Option<CountMode>,
    headers: BTreeMap<String, String>,
    joins: Vec<Join>,
    raw_query: Option<String>,
    method: Method,
    single_result: bool,
    client: Option<Client>,
}

impl QueryBuilder {
    /// Create a builder for `table` that is not yet bound to a client
    pub fn new(table: &str) -> Self {
        Self {
            table_name: table.to_string(),
            select_columns: None,
            filters: Vec::new(),
            grouped_filters: Vec::new(),
            negated_filters: Vec::new(),
            order_clause: None,
            limit_value: None,
            offset_value: None,
            range_value: None,
            count_mode: None,
            headers: BTreeMap::new(),
            joins: Vec::new(),
            raw_query: None,
            method: Method::Get,
            single_result: false,
            client: None,
        }
    }

    /// Bind the builder to the client whose transport will send it
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Select specific columns, replacing any earlier selection
    ///
    /// # Examples
    /// ```
    /// use supaorm_core::QueryBuilder;
    ///
    /// let query = QueryBuilder::new("users").select(("id", "profile(avatar_url)"));
    /// assert_eq!(query.select_expression(), Some("id,profile(avatar_url)"));
    /// ```
    pub fn select<T>(mut self, columns: T) -> Self
    where
        T: IntoColumns,
    {
        let joined = columns.into_columns().join(",");
        self.select_columns = (!joined.is_empty()).then_some(joined);
        self
    }

    /// Add a filter rendered as `column.operator.value`
    ///
    /// # Examples
    /// ```
    /// use supaorm_core::{op, QueryBuilder};
    ///
    /// let query = QueryBuilder::new("users")
    ///     .where_("age", op::GT, 18)
    ///     .where_("id", "in", vec![1, 2, 3]);
    /// assert_eq!(query.filters(), ["age.gt.18", "id.in.(1,2,3)"]);
    /// ```
    pub fn where_<O, V>(mut self, column: &str, operator: O, value: V) -> Self
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        let filter = format!("{}.{}.{}", column, operator.into_operator(), value.into());
        self.filters.push(filter);
        self
    }

    /// Alias for [`QueryBuilder::where_`]
    pub fn filter<O, V>(self, column: &str, operator: O, value: V) -> Self
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        self.where_(column, operator, value)
    }

    /// Add a filter wrapped as `or(column.operator.value)`
    pub fn or_where<O, V>(mut self, column: &str, operator: O, value: V) -> Self
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        let filter = format!("or({}.{}.{})", column, operator.into_operator(), value.into());
        self.filters.push(filter);
        self
    }

    /// Add a literal condition wrapped as `and(condition)`
    pub fn where_raw(mut self, condition: &str) -> Self {
        self.filters.push(format!("and({})", condition));
        self
    }

    /// Add one `or=(f1,f2,...)` group of pre-formatted filters
    pub fn or<I, S>(self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group(GroupConnector::Or, filters)
    }

    /// Add one `and=(f1,f2,...)` group of pre-formatted filters
    pub fn and<I, S>(self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group(GroupConnector::And, filters)
    }

    fn group<I, S>(mut self, connector: GroupConnector, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let filters: Vec<String> = filters.into_iter().map(Into::into).collect();
        if !filters.is_empty() {
            self.grouped_filters.push(GroupedFilter { connector, filters });
        }
        self
    }

    /// Add a negated filter, sent as `column=not.operator.value`
    pub fn not<O, V>(mut self, column: &str, operator: O, value: V) -> Self
    where
        O: IntoOperator,
        V: Into<Value>,
    {
        self.negated_filters.push(NegatedFilter {
            column: column.to_string(),
            operator: operator.into_operator(),
            value: value.into(),
        });
        self
    }

    /// Set the ordering, replacing any earlier one
    ///
    /// The direction may carry qualifiers such as `desc.nullslast`.
    pub fn order<D>(mut self, column: &str, direction: D) -> Self
    where
        D: IntoDirection,
    {
        self.order_clause = Some((column.to_string(), direction.into_direction()));
        self
    }

    pub fn order_asc(self, column: &str) -> Self {
        self.order(column, "asc")
    }

    pub fn order_desc(self, column: &str) -> Self {
        self.order(column, "desc")
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_value = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_value = Some(offset);
        self
    }

    /// Request rows `start..=end` through the `Range` header
    pub fn range(mut self, start: u64, end: u64) -> Self {
        self.range_value = Some((start, end));
        self
    }

    /// Ask the server for an exact row count
    pub fn count(self) -> Self {
        self.count_with(CountMode::Exact)
    }

    pub fn count_with(mut self, mode: CountMode) -> Self {
        self.count_mode = Some(mode);
        self
    }

    /// Set one request header, replacing an earlier value for the same key
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Embed a related table; it reaches the request as `foreign_table(*)`
    pub fn join<O>(
        mut self,
        foreign_table: &str,
        local_column: &str,
        operator: O,
        foreign_column: &str,
    ) -> Self
    where
        O: IntoOperator,
    {
        self.joins.push(Join {
            foreign_table: foreign_table.to_string(),
            local_column: local_column.to_string(),
            operator: operator.into_operator(),
            foreign_column: foreign_column.to_string(),
        });
        self
    }

    pub fn inner_join(self, foreign_table: &str, local_column: &str, foreign_column: &str) -> Self {
        self.join(foreign_table, local_column, Operator::EQ, foreign_column)
    }

    /// Join that keeps parent rows without a match
    ///
    /// PostgREST embeds are inner by nature; unmatched rows are kept by
    /// asking the server to fill missing values with nulls.
    pub fn left_join(self, foreign_table: &str, local_column: &str, foreign_column: &str) -> Self {
        self.join(foreign_table, local_column, Operator::EQ, foreign_column)
            .header(PREFER, "missing=null")
    }

    /// Run `query` through the `execute_sql` procedure instead of the table
    /// endpoint; filters, ordering, pagination and joins are then ignored
    pub fn raw(mut self, query: &str) -> Self {
        self.raw_query = Some(query.to_string());
        self
    }

    /// Ask for a single JSON object instead of an array
    pub fn single(mut self) -> Self {
        self.single_result = true;
        self
    }

    /// A fresh builder for `{table}.{foreign_table}`
    ///
    /// Only the client binding is carried over; no filters or ordering are
    /// shared with `self`.
    pub fn foreign_table(&self, foreign_table: &str) -> Self {
        let builder = QueryBuilder::new(&format!("{}.{}", self.table_name, foreign_table));
        match &self.client {
            Some(client) => builder.with_client(client.clone()),
            None => builder,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    pub fn select_expression(&self) -> Option<&str> {
        self.select_columns.as_deref()
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    pub fn grouped_filters(&self) -> &[GroupedFilter] {
        &self.grouped_filters
    }

    pub fn negated_filters(&self) -> &[NegatedFilter] {
        &self.negated_filters
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn raw_query(&self) -> Option<&str> {
        self.raw_query.as_deref()
    }

    pub fn is_single(&self) -> bool {
        self.single_result
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// `order=column.direction`
    pub fn order_expression(&self) -> Option<String> {
        self.order_clause
            .as_ref()
            .map(|(column, direction)| format!("order={}.{}", column, direction))
    }

    pub fn limit_expression(&self) -> Option<String> {
        self.limit_value.map(|limit| format!("limit={}", limit))
    }

    pub fn offset_expression(&self) -> Option<String> {
        self.offset_value.map(|offset| format!("offset={}", offset))
    }

    pub fn range_expression(&self) -> Option<String> {
        self.range_value
            .map(|(start, end)| format!("range={}-{}", start, end))
    }

    pub fn count_expression(&self) -> Option<String> {
        self.count_mode.map(|mode| format!("count={}", mode))
    }

    /// Path and query string of the accumulated query
    ///
    /// Fragments appear in a fixed order: select, filters, order, limit,
    /// offset, count.
    pub fn build_url(&self) -> String {
        let mut url = format!("/{}", self.table_name);

        let mut params = Vec::new();
        if let Some(select) = self.select_expression() {
            params.push(format!("select={}", select));
        }
        params.extend(self.filters.iter().cloned());
        params.extend(self.order_expression());
        params.extend(self.limit_expression());
        params.extend(self.offset_expression());
        params.extend(self.count_expression());

        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        url
    }

    /// Serialize the builder as it would be sent for its current method
    pub fn prepare(&self, config: &ClientConfig) -> PreparedRequest {
        self.prepare_with_body(config, None)
    }

    fn prepare_with_body(
        &self,
        config: &ClientConfig,
        body: Option<serde_json::Value>,
    ) -> PreparedRequest {
        let mut prefer: Vec<String> = Vec::new();
        let mut headers: Vec<(String, String)> = Vec::new();
        for (key, value) in &self.headers {
            if key.eq_ignore_ascii_case(PREFER) {
                prefer.push(value.clone());
            } else {
                headers.push((key.clone(), value.clone()));
            }
        }

        if let Some(raw) = &self.raw_query {
            trace!(table = %self.table_name, "sending raw query through {}", RAW_QUERY_PROCEDURE);

            let mut request = PreparedRequest::new(Method::Post, config.rpc_url(RAW_QUERY_PROCEDURE));
            request.headers = headers;
            if !prefer.is_empty() {
                request.headers.push((PREFER.to_string(), prefer.join(",")));
            }
            request.body = Some(serde_json::json!({ "query": raw }));
            return request;
        }

        let mut request = PreparedRequest::new(self.method, config.table_url(&self.table_name));

        if let Some(select) = self.select_with_joins() {
            request.query.push(("select".to_string(), select));
        }
        for filter in &self.filters {
            request.query.push(("and".to_string(), filter.clone()));
        }
        for group in &self.grouped_filters {
            request.query.push(group.query_pair());
        }
        for negated in &self.negated_filters {
            request.query.push(negated.query_pair());
        }
        if let Some((column, direction)) = &self.order_clause {
            request
                .query
                .push(("order".to_string(), format!("{}.{}", column, direction)));
        }
        if let Some(limit) = self.limit_value {
            request.query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset_value {
            request.query.push(("offset".to_string(), offset.to_string()));
        }

        if let Some((start, end)) = self.range_value {
            headers.push(("Range".to_string(), format!("{}-{}", start, end)));
            headers.push(("Range-Unit".to_string(), "items".to_string()));
        }
        if self.single_result && !self.headers.keys().any(|k| k.eq_ignore_ascii_case("accept")) {
            headers.push(("Accept".to_string(), SINGLE_OBJECT_ACCEPT.to_string()));
        }

        if let Some(mode) = self.count_mode {
            prefer.push(format!("count={}", mode));
        }
        if matches!(self.method, Method::Post | Method::Patch) && body.is_some() {
            prefer.push("return=representation".to_string());
        }
        if !prefer.is_empty() {
            headers.push((PREFER.to_string(), prefer.join(",")));
        }

        request.headers = headers;
        request.body = body;
        request
    }

    /// Explicit selection extended with one `table(*)` per join
    fn select_with_joins(&self) -> Option<String> {
        if self.joins.is_empty() {
            return self.select_columns.clone();
        }

        let embeds: Vec<String> = self.joins.iter().map(Join::projection).collect();
        let base = self.select_columns.as_deref().unwrap_or("*");
        Some(format!("{},{}", base, embeds.join(",")))
    }

    async fn send(&self, body: Option<serde_json::Value>) -> Result<RawResponse> {
        let client = self.client.as_ref().ok_or_else(|| {
            Error::invalid_query(format!(
                "query on '{}' is not bound to a client",
                self.table_name
            ))
        })?;

        let request = self.prepare_with_body(client.config(), body);
        client.send(request).await
    }

    /// Run the query and decode the response into `T`
    pub async fn get<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(None).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Run the query and return the decoded rows with the total row count
    /// reported in `Content-Range`
    ///
    /// Asks for an exact count unless [`QueryBuilder::count_with`] already
    /// chose a mode. The total is `None` when the server did not report one.
    pub async fn get_with_count<T>(mut self) -> Result<(T, Option<u64>)>
    where
        T: DeserializeOwned,
    {
        if self.count_mode.is_none() {
            self.count_mode = Some(CountMode::Exact);
        }

        let response = self.send(None).await?;
        let total = response.total_count();
        trace!(table = %self.table_name, ?total, "counted rows");
        Ok((serde_json::from_slice(&response.body)?, total))
    }

    /// Run the query with `limit=1`
    pub async fn first<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.limit(1).get().await
    }

    /// Same as [`QueryBuilder::get`]
    pub async fn execute<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.get().await
    }

    /// POST `data` to the table; a returned row is decoded back into `data`
    pub async fn insert<T>(mut self, data: &mut T) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        self.method = Method::Post;
        self.write(data).await
    }

    /// PATCH the rows matched by the filters with `data`; a returned row is
    /// decoded back into `data`
    pub async fn update<T>(mut self, data: &mut T) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        self.method = Method::Patch;
        self.write(data).await
    }

    /// DELETE the rows matched by the filters
    pub async fn delete(mut self) -> Result<()> {
        self.method = Method::Delete;
        self.send(None).await?;
        Ok(())
    }

    async fn write<T>(&self, data: &mut T) -> Result<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let payload = serde_json::to_value(&*data)?;
        let response = self.send(Some(payload)).await?;
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        let returned: serde_json::Value = serde_json::from_slice(&response.body)?;
        *data = decode_written(returned)?;
        Ok(())
    }
}

/// Decode the representation returned by a write
///
/// PostgREST answers `return=representation` with an array of rows; a
/// one-row array is unwrapped when `T` does not accept the array itself.
fn decode_written<T: DeserializeOwned>(returned: serde_json::Value) -> Result<T> {
    match serde_json::from_value(returned.clone()) {
        Ok(value) => Ok(value),
        Err(err) => match returned {
            serde_json::Value::Array(mut rows) if rows.len() == 1 => {
                Ok(serde_json::from_value(rows.remove(0))?)
            }
            _ => Err(err.into()),
        },
    }
}
