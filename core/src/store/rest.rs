// bobabble/src/store/rest.rs

//! `RecordStore` over a PostgREST-style HTTP API (`{url}/rest/v1/{table}`).

use super::{Filter, Query, RecordStore};
use crate::error::StoreError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

// PostgREST: "JSON object requested, multiple (or no) rows returned".
const NO_ROWS_CODE: &str = "PGRST116";

#[derive(Clone)]
pub struct RestStore {
  base_url: String,
  anon_key: String,
  http: Client,
}

impl RestStore {
  pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into().trim_end_matches('/').to_string(),
      anon_key: anon_key.into(),
      http: Client::new(),
    }
  }

  fn endpoint(&self, table: &str) -> String {
    format!("{}/rest/v1/{}", self.base_url, table)
  }

  fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
    request
      .header("apikey", &self.anon_key)
      .bearer_auth(&self.anon_key)
  }

  async fn rows(table: &str, response: Response) -> Result<Vec<Value>, StoreError> {
    let status = response.status();
    if !status.is_success() {
      let text = response.text().await.unwrap_or_default();
      return Err(remote_error(table, status.as_u16(), &text));
    }
    Ok(response.json::<Vec<Value>>().await?)
  }
}

impl std::fmt::Debug for RestStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RestStore").field("base_url", &self.base_url).finish_non_exhaustive()
  }
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
  #[serde(default)]
  code: Option<String>,
  #[serde(default)]
  message: Option<String>,
}

fn remote_error(table: &str, status: u16, body: &str) -> StoreError {
  let parsed = serde_json::from_str::<PostgrestError>(body).ok();
  let code = parsed.as_ref().and_then(|p| p.code.clone());
  if code.as_deref() == Some(NO_ROWS_CODE) {
    return StoreError::NoRows {
      table: table.to_string(),
    };
  }
  let message = parsed
    .and_then(|p| p.message)
    .unwrap_or_else(|| body.to_string());
  StoreError::Remote { status, code, message }
}

fn filter_literal(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    Value::Null => "null".to_string(),
    other => other.to_string(),
  }
}

/// `col=eq.value` pairs. A null filter becomes `col=is.null`.
fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
  filters
    .iter()
    .map(|f| {
      let op = if f.value.is_null() { "is" } else { "eq" };
      (f.column.clone(), format!("{}.{}", op, filter_literal(&f.value)))
    })
    .collect()
}

fn query_params(query: &Query) -> Vec<(String, String)> {
  let mut params = vec![("select".to_string(), "*".to_string())];
  params.extend(filter_params(&query.filters));
  if !query.order.is_empty() {
    let order = query
      .order
      .iter()
      .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
      .collect::<Vec<_>>()
      .join(",");
    params.push(("order".to_string(), order));
  }
  params
}

#[async_trait]
impl RecordStore for RestStore {
  #[instrument(name = "RestStore::select", skip(self), fields(table = %query.table), err(Display))]
  async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
    let request = self.http.get(self.endpoint(&query.table)).query(&query_params(query));
    let response = self.authorized(request).send().await?;
    let rows = Self::rows(&query.table, response).await?;
    debug!(rows = rows.len(), "Select returned rows.");
    Ok(rows)
  }

  #[instrument(name = "RestStore::insert", skip(self, row), err(Display))]
  async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
    let request = self
      .http
      .post(self.endpoint(table))
      .header("Prefer", "return=representation")
      .json(&row);
    let response = self.authorized(request).send().await?;
    Self::rows(table, response)
      .await?
      .into_iter()
      .next()
      .ok_or_else(|| StoreError::NoRows {
        table: table.to_string(),
      })
  }

  #[instrument(name = "RestStore::update", skip(self, filters, patch), err(Display))]
  async fn update(&self, table: &str, filters: &[Filter], patch: Value) -> Result<Vec<Value>, StoreError> {
    let request = self
      .http
      .patch(self.endpoint(table))
      .query(&filter_params(filters))
      .header("Prefer", "return=representation")
      .json(&patch);
    let response = self.authorized(request).send().await?;
    Self::rows(table, response).await
  }

  #[instrument(name = "RestStore::delete", skip(self, filters), err(Display))]
  async fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
    let request = self
      .http
      .delete(self.endpoint(table))
      .query(&filter_params(filters))
      .header("Prefer", "return=representation");
    let response = self.authorized(request).send().await?;
    Ok(Self::rows(table, response).await?.len() as u64)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn query_params_render_postgrest_syntax() {
    let query = Query::from("milk_options").eq("available", true).order_asc("price");
    let params = query_params(&query);
    assert_eq!(
      params,
      vec![
        ("select".to_string(), "*".to_string()),
        ("available".to_string(), "eq.true".to_string()),
        ("order".to_string(), "price.asc".to_string()),
      ]
    );

    let newest_first = query_params(&Query::from("orders").order_desc("created_at").order_asc("id"));
    assert_eq!(newest_first.last(), Some(&("order".to_string(), "created_at.desc,id.asc".to_string())));
  }

  #[test]
  fn string_filters_are_not_json_quoted() {
    let params = filter_params(&[Filter::eq("id", "abc-123"), Filter::eq("order_id", Value::Null)]);
    assert_eq!(params[0], ("id".to_string(), "eq.abc-123".to_string()));
    assert_eq!(params[1], ("order_id".to_string(), "is.null".to_string()));
  }

  #[test]
  fn pgrst116_maps_to_no_rows() {
    let body = json!({"code": "PGRST116", "message": "JSON object requested, multiple (or no) rows returned"});
    let err = remote_error("orders", 406, &body.to_string());
    assert!(err.is_no_rows());

    let other = remote_error("orders", 500, "upstream timeout");
    match other {
      StoreError::Remote { status, code, message } => {
        assert_eq!(status, 500);
        assert!(code.is_none());
        assert_eq!(message, "upstream timeout");
      }
      e => panic!("unexpected error {e:?}"),
    }
  }

  #[test]
  fn endpoint_trims_trailing_slash() {
    let store = RestStore::new("https://abc.supabase.co/", "anon");
    assert_eq!(store.endpoint("drinks"), "https://abc.supabase.co/rest/v1/drinks");
  }
}
