// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use bobabble::catalog::builtin;
use bobabble::models::tables;
use bobabble::{Backend, Drink, MemoryStore, MilkOption, SweetnessLevel, Topping};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::Level;

// --- Catalog fixtures (the built-in demo menu) ---

pub fn drink(name: &str) -> Drink {
  builtin::drinks()
    .into_iter()
    .find(|d| d.name == name)
    .unwrap_or_else(|| panic!("no built-in drink named {name}"))
}

pub fn topping(name: &str) -> Topping {
  builtin::toppings()
    .into_iter()
    .find(|t| t.name == name)
    .unwrap_or_else(|| panic!("no built-in topping named {name}"))
}

pub fn milk(name: &str) -> MilkOption {
  builtin::milk_options()
    .into_iter()
    .find(|m| m.name == name)
    .unwrap_or_else(|| panic!("no built-in milk option named {name}"))
}

pub fn sweetness(name: &str) -> SweetnessLevel {
  builtin::sweetness_levels()
    .into_iter()
    .find(|s| s.name == name)
    .unwrap_or_else(|| panic!("no built-in sweetness level named {name}"))
}

/// The configuration from the five-dollar scenario.
pub struct ClassicPick {
  pub drink: Drink,
  pub toppings: Vec<Topping>,
  pub milk: MilkOption,
  pub sweetness: SweetnessLevel,
}

pub fn classic_with_pearls() -> ClassicPick {
  ClassicPick {
    drink: drink("Classic Milk Tea"),
    toppings: vec![topping("Tapioca Pearls")],
    milk: milk("Regular Milk"),
    sweetness: builtin::sweetness_levels().remove(2),
  }
}

// --- Store fixtures ---

fn rows<T: Serialize>(records: &[T]) -> Vec<Value> {
  records
    .iter()
    .map(|r| serde_json::to_value(r).expect("catalog fixture serializes"))
    .collect()
}

/// A memory store holding the built-in menu as if it were live data.
pub fn seeded_store() -> Arc<MemoryStore> {
  let store = Arc::new(MemoryStore::new());
  store.seed(tables::DRINKS, rows(&builtin::drinks()));
  store.seed(tables::TOPPINGS, rows(&builtin::toppings()));
  store.seed(tables::MILK_OPTIONS, rows(&builtin::milk_options()));
  store.seed(tables::SWEETNESS_LEVELS, rows(&builtin::sweetness_levels()));
  store
}

pub fn backend(store: &Arc<MemoryStore>) -> Backend {
  Backend::Configured(store.clone())
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
