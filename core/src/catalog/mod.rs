// bobabble/src/catalog/mod.rs

//! Catalog reads (drinks and add-ons).
//!
//! Every read has two forms:
//! - `fetch_*` returns a [`Fetched`] that says whether the data is live, the
//!   store is unconfigured, or the store failed.
//! - `get_*` resolves that through the gateway's [`FallbackPolicy`].
//!
//! Under the default `FallbackPolicy::BuiltIn`, an unconfigured store and a
//! failing store both produce the built-in demo menu. This keeps the storefront
//! usable offline but also hides real outages: the only trace is the WARN event
//! emitted on every fallback. Use `FallbackPolicy::Surface` where an outage
//! must be visible.

pub mod builtin;

use crate::error::{CatalogError, StoreError};
use crate::models::{tables, CategoryFilter, Drink, MilkOption, SweetnessLevel, Topping};
use crate::store::{decode_rows, Backend, Query};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

/// Outcome of one catalog read against the remote store.
#[derive(Debug)]
pub enum Fetched<T> {
  Live(T),
  Unconfigured,
  RemoteError(StoreError),
}

impl<T> Fetched<T> {
  pub fn is_live(&self) -> bool {
    matches!(self, Fetched::Live(_))
  }

  pub fn live(self) -> Option<T> {
    match self {
      Fetched::Live(data) => Some(data),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
  /// Substitute the built-in menu when the store is unconfigured or failing.
  #[default]
  BuiltIn,
  /// Report unconfigured/failing reads as `CatalogError`.
  Surface,
}

impl std::str::FromStr for FallbackPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "builtin" | "built-in" => Ok(FallbackPolicy::BuiltIn),
      "surface" => Ok(FallbackPolicy::Surface),
      other => Err(format!("Unknown catalog fallback policy '{}'", other)),
    }
  }
}

#[derive(Debug, Clone)]
pub struct CatalogGateway {
  backend: Backend,
  policy: FallbackPolicy,
}

impl CatalogGateway {
  pub fn new(backend: Backend) -> Self {
    Self {
      backend,
      policy: FallbackPolicy::default(),
    }
  }

  pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn policy(&self) -> FallbackPolicy {
    self.policy
  }

  async fn fetch<T: DeserializeOwned>(&self, query: Query) -> Fetched<Vec<T>> {
    let Some(store) = self.backend.store() else {
      return Fetched::Unconfigured;
    };
    match store.select(&query).await {
      Ok(rows) => match decode_rows(&query.table, rows) {
        Ok(records) => Fetched::Live(records),
        Err(e) => Fetched::RemoteError(e),
      },
      Err(e) => Fetched::RemoteError(e),
    }
  }

  fn resolve<T>(
    &self,
    table: &str,
    fetched: Fetched<Vec<T>>,
    fallback: impl FnOnce() -> Vec<T>,
  ) -> Result<Vec<T>, CatalogError> {
    match (fetched, self.policy) {
      (Fetched::Live(records), _) => {
        debug!(%table, count = records.len(), "Catalog read served live data.");
        Ok(records)
      }
      (Fetched::Unconfigured, FallbackPolicy::BuiltIn) => {
        warn!(%table, "Remote store not configured; serving built-in catalog data.");
        Ok(fallback())
      }
      (Fetched::RemoteError(e), FallbackPolicy::BuiltIn) => {
        warn!(%table, error = %e, "Catalog read failed; serving built-in catalog data instead.");
        Ok(fallback())
      }
      (Fetched::Unconfigured, FallbackPolicy::Surface) => Err(CatalogError::NotConfigured),
      (Fetched::RemoteError(source), FallbackPolicy::Surface) => Err(CatalogError::Remote {
        table: table.to_string(),
        source,
      }),
    }
  }

  // --- Tagged reads ---

  pub async fn fetch_drinks(&self) -> Fetched<Vec<Drink>> {
    self.fetch(Query::from(tables::DRINKS).order_asc("name")).await
  }

  pub async fn fetch_drinks_by_category(&self, category: CategoryFilter) -> Fetched<Vec<Drink>> {
    match category {
      CategoryFilter::All => self.fetch_drinks().await,
      CategoryFilter::Only(category) => {
        let query = Query::from(tables::DRINKS)
          .eq("category", category.as_str())
          .order_asc("name");
        self.fetch(query).await
      }
    }
  }

  pub async fn fetch_toppings(&self) -> Fetched<Vec<Topping>> {
    let query = Query::from(tables::TOPPINGS).eq("available", true).order_asc("name");
    self.fetch(query).await
  }

  pub async fn fetch_milk_options(&self) -> Fetched<Vec<MilkOption>> {
    let query = Query::from(tables::MILK_OPTIONS)
      .eq("available", true)
      .order_asc("price");
    self.fetch(query).await
  }

  pub async fn fetch_sweetness_levels(&self) -> Fetched<Vec<SweetnessLevel>> {
    self
      .fetch(Query::from(tables::SWEETNESS_LEVELS).order_asc("level"))
      .await
  }

  pub async fn fetch_popular_drinks(&self) -> Fetched<Vec<Drink>> {
    let query = Query::from(tables::DRINKS).eq("popular", true).order_asc("name");
    self.fetch(query).await
  }

  // --- Policy-resolved reads ---

  #[instrument(name = "CatalogGateway::get_drinks", skip(self), err(Display))]
  pub async fn get_drinks(&self) -> Result<Vec<Drink>, CatalogError> {
    let fetched = self.fetch_drinks().await;
    self.resolve(tables::DRINKS, fetched, fallback_drinks)
  }

  #[instrument(name = "CatalogGateway::get_drinks_by_category", skip(self), err(Display))]
  pub async fn get_drinks_by_category(&self, category: CategoryFilter) -> Result<Vec<Drink>, CatalogError> {
    let fetched = self.fetch_drinks_by_category(category).await;
    self.resolve(tables::DRINKS, fetched, || match category {
      CategoryFilter::All => fallback_drinks(),
      CategoryFilter::Only(wanted) => fallback_drinks().into_iter().filter(|d| d.category == wanted).collect(),
    })
  }

  #[instrument(name = "CatalogGateway::get_toppings", skip(self), err(Display))]
  pub async fn get_toppings(&self) -> Result<Vec<Topping>, CatalogError> {
    let fetched = self.fetch_toppings().await;
    self.resolve(tables::TOPPINGS, fetched, || {
      let mut toppings: Vec<Topping> = builtin::toppings().into_iter().filter(|t| t.available).collect();
      toppings.sort_by(|a, b| a.name.cmp(&b.name));
      toppings
    })
  }

  #[instrument(name = "CatalogGateway::get_milk_options", skip(self), err(Display))]
  pub async fn get_milk_options(&self) -> Result<Vec<MilkOption>, CatalogError> {
    let fetched = self.fetch_milk_options().await;
    self.resolve(tables::MILK_OPTIONS, fetched, || {
      let mut milks: Vec<MilkOption> = builtin::milk_options().into_iter().filter(|m| m.available).collect();
      // Stable sort keeps id order among equal prices, matching insertion order in the store.
      milks.sort_by(|a, b| a.price.cmp(&b.price));
      milks
    })
  }

  #[instrument(name = "CatalogGateway::get_sweetness_levels", skip(self), err(Display))]
  pub async fn get_sweetness_levels(&self) -> Result<Vec<SweetnessLevel>, CatalogError> {
    let fetched = self.fetch_sweetness_levels().await;
    self.resolve(tables::SWEETNESS_LEVELS, fetched, || {
      let mut levels = builtin::sweetness_levels();
      levels.sort_by_key(|s| s.level);
      levels
    })
  }

  #[instrument(name = "CatalogGateway::get_popular_drinks", skip(self), err(Display))]
  pub async fn get_popular_drinks(&self) -> Result<Vec<Drink>, CatalogError> {
    let fetched = self.fetch_popular_drinks().await;
    self.resolve(tables::DRINKS, fetched, || {
      fallback_drinks().into_iter().filter(|d| d.popular).collect()
    })
  }
}

fn fallback_drinks() -> Vec<Drink> {
  let mut drinks = builtin::drinks();
  drinks.sort_by(|a, b| a.name.cmp(&b.name));
  drinks
}
