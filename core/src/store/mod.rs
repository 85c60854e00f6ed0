// bobabble/src/store/mod.rs

//! The remote record store: named collections of JSON rows supporting
//! filter-by-equality, order-by, and insert/select/update/delete.
//!
//! `RestStore` talks to a PostgREST-style HTTP API (what Supabase exposes);
//! `MemoryStore` keeps rows in-process for tests and demo runs.

pub mod memory;
pub mod rest;

pub use memory::{MemoryStore, Verb};
pub use rest::RestStore;

use crate::config::StoreConfig;
use crate::error::StoreError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Equality filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
  pub column: String,
  pub value: Value,
}

impl Filter {
  pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
    Self {
      column: column.into(),
      value: value.into(),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
  pub column: String,
  pub ascending: bool,
}

/// A select against one collection. Built fluently:
/// `Query::from("toppings").eq("available", true).order_asc("name")`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
  pub table: String,
  pub filters: Vec<Filter>,
  pub order: Vec<OrderBy>,
}

impl Query {
  pub fn from(table: impl Into<String>) -> Self {
    Self {
      table: table.into(),
      filters: Vec::new(),
      order: Vec::new(),
    }
  }

  pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
    self.filters.push(Filter::eq(column, value));
    self
  }

  pub fn order_asc(mut self, column: impl Into<String>) -> Self {
    self.order.push(OrderBy {
      column: column.into(),
      ascending: true,
    });
    self
  }

  pub fn order_desc(mut self, column: impl Into<String>) -> Self {
    self.order.push(OrderBy {
      column: column.into(),
      ascending: false,
    });
    self
  }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
  async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError>;

  /// Inserts one row and returns it as stored (with generated `id`/timestamps).
  async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError>;

  /// Applies `patch` to every matching row and returns the updated rows.
  async fn update(&self, table: &str, filters: &[Filter], patch: Value) -> Result<Vec<Value>, StoreError>;

  /// Deletes every matching row and returns how many were removed.
  async fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError>;
}

/// The process-wide store handle, built once at startup and handed to the
/// gateways. `Unconfigured` is a normal state (demo mode), not an error.
#[derive(Clone)]
pub enum Backend {
  Unconfigured,
  Configured(Arc<dyn RecordStore>),
}

impl Backend {
  pub fn from_config(config: &StoreConfig) -> Self {
    match (config.is_configured(), config.url.as_deref(), config.anon_key.as_deref()) {
      (true, Some(url), Some(key)) => Backend::Configured(Arc::new(RestStore::new(url, key))),
      _ => Backend::Unconfigured,
    }
  }

  pub fn with_store(store: impl RecordStore + 'static) -> Self {
    Backend::Configured(Arc::new(store))
  }

  pub fn store(&self) -> Option<&Arc<dyn RecordStore>> {
    match self {
      Backend::Configured(store) => Some(store),
      Backend::Unconfigured => None,
    }
  }

  pub fn is_configured(&self) -> bool {
    matches!(self, Backend::Configured(_))
  }
}

impl std::fmt::Debug for Backend {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Backend::Unconfigured => f.write_str("Backend::Unconfigured"),
      Backend::Configured(_) => f.write_str("Backend::Configured(..)"),
    }
  }
}

pub(crate) fn decode_row<T: DeserializeOwned>(table: &str, row: Value) -> Result<T, StoreError> {
  serde_json::from_value(row).map_err(|source| StoreError::Decode {
    table: table.to_string(),
    source,
  })
}

pub(crate) fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
  rows.into_iter().map(|row| decode_row(table, row)).collect()
}

/// Reads the string `id` column of a stored row.
pub(crate) fn row_id(table: &str, row: &Value) -> Result<String, StoreError> {
  match row.get("id") {
    Some(Value::String(id)) => Ok(id.clone()),
    Some(Value::Number(n)) => Ok(n.to_string()),
    _ => Err(StoreError::MissingId {
      table: table.to_string(),
    }),
  }
}
