// tests/catalog_tests.rs
mod common;
use bobabble::models::tables;
use bobabble::store::Verb;
use bobabble::{Backend, CatalogError, CatalogGateway, CategoryFilter, DrinkCategory, FallbackPolicy, Fetched};
use common::*;
use serde_json::json;
use serial_test::serial;

fn names<T>(records: &[T], name: impl Fn(&T) -> &str) -> Vec<String> {
  records.iter().map(|r| name(r).to_string()).collect()
}

#[tokio::test]
#[serial]
async fn test_all_category_matches_get_drinks_live_and_fallback() {
  setup_tracing();
  let store = seeded_store();
  let gateways = [
    CatalogGateway::new(backend(&store)),
    CatalogGateway::new(Backend::Unconfigured),
  ];

  for gateway in gateways {
    let all = gateway.get_drinks().await.unwrap();
    let filtered = gateway.get_drinks_by_category(CategoryFilter::All).await.unwrap();
    assert_eq!(all, filtered);
    assert_eq!(all.len(), 10);
  }
  let parsed: CategoryFilter = "all".parse().unwrap();
  assert_eq!(parsed, CategoryFilter::All);
}

#[tokio::test]
#[serial]
async fn test_live_reads_apply_filters_and_ordering() {
  setup_tracing();
  let store = seeded_store();
  store.seed(
    tables::TOPPINGS,
    vec![json!({
      "id": "99", "name": "Aloe Vera", "price": 0.55, "available": false,
      "created_at": "2024-01-01T00:00:00Z"
    })],
  );
  let gateway = CatalogGateway::new(backend(&store));

  let fetched = gateway.fetch_toppings().await;
  assert!(fetched.is_live());
  let toppings = fetched.live().unwrap();
  assert_eq!(toppings.len(), 6, "unavailable toppings are filtered out");
  let topping_names = names(&toppings, |t| &t.name);
  let mut sorted = topping_names.clone();
  sorted.sort();
  assert_eq!(topping_names, sorted);

  let milks = gateway.get_milk_options().await.unwrap();
  assert_eq!(
    names(&milks, |m| &m.name),
    vec!["Regular Milk", "Soy Milk", "Oat Milk", "Almond Milk", "Coconut Milk"]
  );

  let levels = gateway.get_sweetness_levels().await.unwrap();
  assert!(levels.windows(2).all(|w| w[0].level <= w[1].level));

  let popular = gateway.get_popular_drinks().await.unwrap();
  assert_eq!(
    names(&popular, |d| &d.name),
    vec!["Classic Milk Tea", "Matcha Latte", "Taro Milk Tea"]
  );

  let teas = gateway
    .get_drinks_by_category(CategoryFilter::Only(DrinkCategory::Tea))
    .await
    .unwrap();
  assert_eq!(names(&teas, |d| &d.name), vec!["Jasmine Green Tea", "Oolong Tea"]);
}

#[tokio::test]
#[serial]
async fn test_remote_failure_falls_back_to_builtin_data() {
  setup_tracing();
  let store = seeded_store();
  store.fail_on(tables::DRINKS, Verb::Select);
  let gateway = CatalogGateway::new(backend(&store));

  assert!(matches!(gateway.fetch_drinks().await, Fetched::RemoteError(_)));

  let live_equivalent = CatalogGateway::new(Backend::Unconfigured).get_drinks().await.unwrap();
  assert_eq!(gateway.get_drinks().await.unwrap(), live_equivalent);

  let popular = gateway.get_popular_drinks().await.unwrap();
  assert!(popular.iter().all(|d| d.popular));
}

#[tokio::test]
#[serial]
async fn test_surface_policy_reports_remote_failure() {
  setup_tracing();
  let store = seeded_store();
  store.fail_on(tables::MILK_OPTIONS, Verb::Select);
  let gateway = CatalogGateway::new(backend(&store)).with_policy(FallbackPolicy::Surface);

  match gateway.get_milk_options().await {
    Err(CatalogError::Remote { table, .. }) => assert_eq!(table, tables::MILK_OPTIONS),
    other => panic!("expected remote error, got {other:?}"),
  }
  // Unaffected tables still read live.
  assert_eq!(gateway.get_toppings().await.unwrap().len(), 6);
}

#[tokio::test]
#[serial]
async fn test_undecodable_rows_count_as_remote_errors() {
  setup_tracing();
  let store = seeded_store();
  store.seed(tables::SWEETNESS_LEVELS, vec![json!({"id": "bad", "name": "Broken"})]);
  let gateway = CatalogGateway::new(backend(&store));

  assert!(matches!(gateway.fetch_sweetness_levels().await, Fetched::RemoteError(_)));
  assert_eq!(gateway.get_sweetness_levels().await.unwrap().len(), 5);
}
