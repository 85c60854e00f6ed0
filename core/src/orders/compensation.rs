// bobabble/src/orders/compensation.rs

//! Undo log for a multi-row order write. The store has no transactions, so
//! `create_order` records every row it writes and, if a later write fails,
//! deletes them again newest first.

use crate::store::{Filter, RecordStore};
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WrittenRow {
  pub table: &'static str,
  pub id: String,
}

#[derive(Debug, Default)]
pub(crate) struct WriteLog {
  rows: Vec<WrittenRow>,
}

impl WriteLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record(&mut self, table: &'static str, id: impl Into<String>) {
    self.rows.push(WrittenRow { table, id: id.into() });
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  /// Deletes every recorded row in reverse write order. Failures are logged
  /// and skipped; the caller still reports the error that triggered the
  /// rollback. Returns how many rows could not be removed.
  pub async fn roll_back(self, store: &dyn RecordStore) -> usize {
    let mut leftovers = 0;
    for row in self.rows.into_iter().rev() {
      match store.delete(row.table, &[Filter::eq("id", row.id.as_str())]).await {
        Ok(removed) => debug!(table = row.table, id = %row.id, removed, "Compensating delete applied."),
        Err(e) => {
          leftovers += 1;
          error!(
            table = row.table,
            id = %row.id,
            error = %e,
            "Compensating delete failed; row left behind."
          );
        }
      }
    }
    leftovers
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::{MemoryStore, Verb};
  use serde_json::json;

  #[tokio::test]
  async fn roll_back_deletes_newest_first_and_counts_failures() {
    let store = MemoryStore::new();
    store.seed("orders", vec![json!({"id": "o1"})]);
    store.seed("order_items", vec![json!({"id": "i1"}), json!({"id": "i2"})]);
    store.fail_on("orders", Verb::Delete);

    let mut log = WriteLog::new();
    log.record("orders", "o1");
    log.record("order_items", "i1");
    log.record("order_items", "i2");
    assert_eq!(log.len(), 3);

    let leftovers = log.roll_back(&store).await;
    assert_eq!(leftovers, 1);
    assert!(store.rows("order_items").is_empty());
    assert_eq!(store.rows("orders").len(), 1);
  }
}
