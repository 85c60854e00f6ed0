// tests/cart_submit_tests.rs
mod common;
use async_trait::async_trait;
use bobabble::models::tables;
use bobabble::store::{Filter, Query, Verb};
use bobabble::{Backend, CartStore, CustomerInfo, MemoryStore, OrderError, OrderGateway, RecordStore, StoreError, SubmitError};
use common::*;
use rust_decimal::Decimal;
use serde_json::Value;
use serial_test::serial;
use std::sync::Arc;
use tokio::sync::Notify;

/// Holds the order-row insert until the test releases it.
struct HeldOrderInsert {
  inner: Arc<MemoryStore>,
  reached: Notify,
  release: Notify,
}

#[async_trait]
impl RecordStore for HeldOrderInsert {
  async fn select(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
    self.inner.select(query).await
  }

  async fn insert(&self, table: &str, row: Value) -> Result<Value, StoreError> {
    if table == tables::ORDERS {
      self.reached.notify_one();
      self.release.notified().await;
    }
    self.inner.insert(table, row).await
  }

  async fn update(&self, table: &str, filters: &[Filter], patch: Value) -> Result<Vec<Value>, StoreError> {
    self.inner.update(table, filters, patch).await
  }

  async fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, StoreError> {
    self.inner.delete(table, filters).await
  }
}

fn add_classic(cart: &CartStore, quantity: u32) {
  let pick = classic_with_pearls();
  cart
    .add_item(&pick.drink, &pick.toppings, &pick.milk, &pick.sweetness, quantity)
    .expect("positive quantity is accepted");
}

#[tokio::test]
#[serial]
async fn test_empty_cart_is_rejected_without_touching_the_store() {
  setup_tracing();
  let store = seeded_store();
  let orders = OrderGateway::new(backend(&store));
  let cart = CartStore::new();

  let result = cart.submit(&orders, None).await;

  assert!(matches!(result, Err(SubmitError::EmptyCart)));
  assert_eq!(store.call_count(), 0);
  assert!(!cart.is_submitting());
}

#[tokio::test]
#[serial]
async fn test_five_dollar_scenario_and_checkout() {
  setup_tracing();
  let store = seeded_store();
  let orders = OrderGateway::new(backend(&store));
  let cart = CartStore::new();

  add_classic(&cart, 1);
  assert_eq!(cart.snapshot().items()[0].unit_price, Decimal::new(500, 2));
  add_classic(&cart, 2);

  let snapshot = cart.snapshot();
  assert_eq!(snapshot.len(), 1);
  assert_eq!(snapshot.items()[0].quantity, 3);
  assert_eq!(snapshot.items()[0].line_total(), Decimal::new(1500, 2));

  let customer = CustomerInfo {
    name: Some("Mina".to_string()),
    email: Some("mina@example.com".to_string()),
  };
  let submitted = cart.submit(&orders, Some(customer)).await.expect("checkout succeeds");

  assert_eq!(submitted.order.total_amount, Decimal::new(1500, 2));
  assert_eq!(submitted.order.customer_name.as_deref(), Some("Mina"));
  assert_eq!(submitted.items.len(), 1);
  assert!(cart.snapshot().is_empty());
  assert!(!cart.is_submitting());

  assert_eq!(store.rows(tables::ORDERS).len(), 1);
  assert_eq!(store.rows(tables::ORDER_ITEMS).len(), 1);
  assert_eq!(store.rows(tables::ORDER_ITEM_TOPPINGS).len(), 1);
}

#[tokio::test]
#[serial]
async fn test_failed_checkout_keeps_the_cart_and_passes_the_error_through() {
  setup_tracing();
  let store = seeded_store();
  store.fail_on(tables::ORDERS, Verb::Insert);
  let orders = OrderGateway::new(backend(&store));
  let cart = CartStore::new();
  add_classic(&cart, 2);
  let before = cart.snapshot();

  let err = cart.submit(&orders, None).await.unwrap_err();

  match err {
    SubmitError::Order(OrderError::Store { operation, .. }) => assert_eq!(operation, "insert_order"),
    other => panic!("expected store error, got {other:?}"),
  }
  assert_eq!(cart.snapshot(), before);
  assert!(!cart.is_submitting());
}

#[tokio::test]
#[serial]
async fn test_unconfigured_backend_fails_checkout_with_not_configured() {
  setup_tracing();
  let orders = OrderGateway::new(Backend::Unconfigured);
  let cart = CartStore::new();
  add_classic(&cart, 1);

  let err = cart.submit(&orders, None).await.unwrap_err();

  assert!(matches!(err, SubmitError::Order(OrderError::NotConfigured)));
  assert_eq!(cart.snapshot().total_items(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_concurrent_submissions_place_exactly_one_order() {
  setup_tracing();
  let store = seeded_store();
  let orders = Arc::new(OrderGateway::new(backend(&store)));
  let cart = Arc::new(CartStore::new());
  add_classic(&cart, 1);

  let handles: Vec<_> = (0..4)
    .map(|_| {
      let orders = orders.clone();
      let cart = cart.clone();
      tokio::spawn(async move { cart.submit(&orders, None).await })
    })
    .collect();

  let mut placed = 0;
  for handle in handles {
    match handle.await.expect("task joins") {
      Ok(_) => placed += 1,
      Err(SubmitError::AlreadySubmitting) | Err(SubmitError::EmptyCart) => {}
      Err(other) => panic!("unexpected error {other:?}"),
    }
  }

  assert_eq!(placed, 1);
  assert_eq!(store.rows(tables::ORDERS).len(), 1);
  assert!(cart.snapshot().is_empty());
}

#[tokio::test]
#[serial]
async fn test_totals_stay_consistent_across_edits() {
  setup_tracing();
  let cart = CartStore::new();
  let pick = classic_with_pearls();
  add_classic(&cart, 1);
  cart
    .add_item(&drink("Thai Tea"), &[], &milk("Oat Milk"), &pick.sweetness, 2)
    .unwrap();

  cart.update(|c| c.update_quantity(1, 4));
  cart.update(|c| c.update_quantity(0, 0));

  let snapshot = cart.snapshot();
  assert_eq!(snapshot.len(), 1);
  assert_eq!(cart.total_items(), 4);
  let expected: Decimal = snapshot.items().iter().map(|i| i.line_total()).sum();
  assert_eq!(cart.total_price(), expected);
  assert_eq!(cart.total_price(), Decimal::new(2100, 2));
}

#[tokio::test]
#[serial]
async fn test_lines_added_during_checkout_survive_it() {
  setup_tracing();
  let store = seeded_store();
  let held = Arc::new(HeldOrderInsert {
    inner: store.clone(),
    reached: Notify::new(),
    release: Notify::new(),
  });
  let orders = Arc::new(OrderGateway::new(Backend::Configured(held.clone())));
  let cart = Arc::new(CartStore::new());
  add_classic(&cart, 2);

  let checkout = {
    let orders = orders.clone();
    let cart = cart.clone();
    tokio::spawn(async move { cart.submit(&orders, None).await })
  };

  held.reached.notified().await;
  assert!(cart.is_submitting());
  let pick = classic_with_pearls();
  cart
    .add_item(&drink("Thai Tea"), &[], &milk("Oat Milk"), &pick.sweetness, 1)
    .unwrap();
  add_classic(&cart, 1);
  held.release.notify_one();

  let submitted = checkout.await.expect("task joins").expect("checkout succeeds");
  assert_eq!(submitted.items.len(), 1);
  assert_eq!(submitted.items[0].quantity, 2);

  let remaining = cart.snapshot();
  assert_eq!(remaining.len(), 2);
  assert_eq!(remaining.items()[0].drink.name, "Classic Milk Tea");
  assert_eq!(remaining.items()[0].quantity, 1);
  assert_eq!(remaining.items()[1].drink.name, "Thai Tea");
  assert_eq!(store.rows(tables::ORDERS).len(), 1);
  assert!(!cart.is_submitting());
}
