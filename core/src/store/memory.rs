// bobabble/src/store/memory.rs

//! In-process `RecordStore`. Emulates the column defaults the hosted store
//! applies on insert (`id`, `created_at`, `updated_at`) and can be told to
//! fail specific calls, which is how the gateway tests exercise outages and
//! partial writes.

use super::{Filter, Query, RecordStore};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
  Select,
  Insert,
  Update,
  Delete,
}

impl fmt::Display for Verb {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Verb::Select => "select",
      Verb::Insert => "insert",
      Verb::Update => "update",
      Verb::Delete => "delete",
    };
    f.write_str(name)
  }
}

#[derive(Debug)]
struct InjectedFailure {
  table: String,
  verb: Verb,
  // Matching calls allowed to succeed before the failure fires.
  successes_left: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
  tables: HashMap<String, Vec<Map<String, Value>>>,
  failures: Vec<InjectedFailure>,
  calls: Vec<(Verb, String)>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
  state: Mutex<MemoryState>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Appends rows to a table verbatim (no defaults applied). Non-object values are skipped.
  pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
    let mut state = self.state.lock();
    let target = state.tables.entry(table.to_string()).or_default();
    target.extend(rows.into_iter().filter_map(|row| match row {
      Value::Object(map) => Some(map),
      _ => None,
    }));
  }

  /// Every subsequent `verb` on `table` fails.
  pub fn fail_on(&self, table: &str, verb: Verb) {
    self.fail_after(table, verb, 0);
  }

  /// The first `successes` matching calls succeed, every later one fails.
  pub fn fail_after(&self, table: &str, verb: Verb, successes: usize) {
    self.state.lock().failures.push(InjectedFailure {
      table: table.to_string(),
      verb,
      successes_left: successes,
    });
  }

  pub fn clear_failures(&self) {
    self.state.lock().failures.clear();
  }

  pub fn rows(&self, table: &str) -> Vec<Value> {
    self
      .state
      .lock()
      .tables
      .get(table)
      .map(|rows| rows.iter().cloned().map(Value::Object).collect())
      .unwrap_or_default()
  }

  /// Total number of calls made against the store, failed ones included.
  pub fn call_count(&self) -> usize {
    self.state.lock().calls.len()
  }

  pub fn calls_for(&self, table: &str, verb: Verb) -> usize {
    self
      .state
      .lock()
      .calls
      .iter()
      .filter(|(v, t)| *v == verb && t == table)
      .count()
  }

  // Records the call and decides whether an injected failure fires for it.
  fn enter(state: &mut MemoryState, table: &str, verb: Verb) -> Result<(), StoreError> {
    state.calls.push((verb, table.to_string()));
    for failure in state.failures.iter_mut() {
      if failure.table != table || failure.verb != verb {
        continue;
      }
      if failure.successes_left == 0 {
        tracing::debug!(%table, %verb, "MemoryStore: injected failure fired.");
        return Err(StoreError::Injected {
          table: table.to_string(),
          verb: verb.to_string(),
        });
      }
      failure.successes_left -= 1;
    }
    Ok(())
  }
}

fn matches_filters(row: &Map<String, Value>, filters: &[Filter]) -> bool {
  filters
    .iter()
    .all(|f| row.get(&f.column).map_or(f.value.is_null(), |v| values_equal(v, &f.value)))
}

// Numbers compare by value so `4.5` matches `4.50`; everything else structurally.
fn values_equal(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
    _ => a == b,
  }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
  match (a, b) {
    (Some(Value::Number(x)), Some(Value::Number(y))) => {
      x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
    }
    (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
    (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
    // Nulls and missing columns sort last, as in Postgres ascending order.
    (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
    (None | Some(Value::Null), _) => Ordering::Greater,
    (_, None | Some(Value::Null)) => Ordering::Less,
    _ => Ordering::Equal,
  }
}

fn now_rfc3339() -> String {
  Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[async_trait]
impl RecordStore for MemoryStore {
  async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
    let mut state = self.state.lock();
    Self::enter(&mut *state, &query.table, Verb::Select)?;

    let mut rows: Vec<Map<String, Value>> = state
      .tables
      .get(&query.table)
      .map(|rows| rows.iter().filter(|r| matches_filters(r, &query.filters)).cloned().collect())
      .unwrap_or_default();

    rows.sort_by(|a, b| {
      query.order.iter().fold(Ordering::Equal, |acc, key| {
        acc.then_with(|| {
          let ord = compare_values(a.get(&key.column), b.get(&key.column));
          if key.ascending {
            ord
          } else {
            ord.reverse()
          }
        })
      })
    });

    Ok(rows.into_iter().map(Value::Object).collect())
  }

  async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
    let mut state = self.state.lock();
    Self::enter(&mut *state, table, Verb::Insert)?;

    let Value::Object(mut map) = row else {
      return Err(StoreError::NotAnObject {
        table: table.to_string(),
      });
    };

    let now = now_rfc3339();
    map
      .entry("id")
      .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    map.entry("created_at").or_insert_with(|| Value::String(now.clone()));
    map.entry("updated_at").or_insert_with(|| Value::String(now));

    state.tables.entry(table.to_string()).or_default().push(map.clone());
    Ok(Value::Object(map))
  }

  async fn update(&self, table: &str, filters: &[Filter], patch: Value) -> Result<Vec<Value>, StoreError> {
    let mut state = self.state.lock();
    Self::enter(&mut *state, table, Verb::Update)?;

    let Value::Object(patch) = patch else {
      return Err(StoreError::NotAnObject {
        table: table.to_string(),
      });
    };

    let mut updated = Vec::new();
    if let Some(rows) = state.tables.get_mut(table) {
      for row in rows.iter_mut().filter(|r| matches_filters(r, filters)) {
        for (column, value) in &patch {
          row.insert(column.clone(), value.clone());
        }
        updated.push(Value::Object(row.clone()));
      }
    }
    Ok(updated)
  }

  async fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
    let mut state = self.state.lock();
    Self::enter(&mut *state, table, Verb::Delete)?;

    let Some(rows) = state.tables.get_mut(table) else {
      return Ok(0);
    };
    let before = rows.len();
    rows.retain(|r| !matches_filters(r, filters));
    Ok((before - rows.len()) as u64)
  }
}
