// bobabble/src/session.rs

//! Per-session helpers for the storefront shell.

use crate::catalog::CatalogGateway;
use crate::error::CatalogError;
use crate::models::{Drink, MilkOption, SweetnessLevel, Topping};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::instrument;

/// Everything the drink customizer offers, loaded in one go.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Menu {
  pub drinks: Vec<Drink>,
  pub toppings: Vec<Topping>,
  pub milk_options: Vec<MilkOption>,
  pub sweetness_levels: Vec<SweetnessLevel>,
}

impl Menu {
  /// Runs the four catalog reads concurrently.
  #[instrument(name = "Menu::load", skip_all, err(Display))]
  pub async fn load(catalog: &CatalogGateway) -> Result<Self, CatalogError> {
    let (drinks, toppings, milk_options, sweetness_levels) = futures_util::try_join!(
      catalog.get_drinks(),
      catalog.get_toppings(),
      catalog.get_milk_options(),
      catalog.get_sweetness_levels(),
    )?;
    Ok(Self {
      drinks,
      toppings,
      milk_options,
      sweetness_levels,
    })
  }

  pub fn find_drink(&self, id: &str) -> Option<&Drink> {
    self.drinks.iter().find(|d| d.id == id)
  }

  pub fn find_topping(&self, id: &str) -> Option<&Topping> {
    self.toppings.iter().find(|t| t.id == id)
  }

  pub fn find_milk_option(&self, id: &str) -> Option<&MilkOption> {
    self.milk_options.iter().find(|m| m.id == id)
  }

  pub fn find_sweetness_level(&self, id: &str) -> Option<&SweetnessLevel> {
    self.sweetness_levels.iter().find(|s| s.id == id)
  }

  /// Resolves topping ids, failing with the first unknown id.
  pub fn resolve_toppings<'a, I>(&self, ids: I) -> Result<Vec<Topping>, String>
  where
    I: IntoIterator<Item = &'a str>,
  {
    ids
      .into_iter()
      .map(|id| self.find_topping(id).cloned().ok_or_else(|| id.to_string()))
      .collect()
  }
}

/// Hands out increasing tickets so a caller can tell whether an async result
/// still belongs to the latest request.
#[derive(Debug, Default)]
pub struct RequestSequencer {
  latest: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl RequestSequencer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Starts a request. Every earlier ticket is now stale.
  pub fn begin(&self) -> Ticket {
    Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
  }

  pub fn is_current(&self, ticket: Ticket) -> bool {
    self.latest.load(Ordering::Acquire) == ticket.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::Backend;

  #[tokio::test]
  async fn builtin_menu_loads_and_resolves_ids() {
    let menu = Menu::load(&CatalogGateway::new(Backend::Unconfigured)).await.unwrap();
    assert_eq!(menu.drinks.len(), 10);
    assert_eq!(menu.toppings.len(), 6);
    assert_eq!(menu.milk_options.len(), 5);
    assert_eq!(menu.sweetness_levels.len(), 5);

    let first = &menu.drinks[0];
    assert_eq!(menu.find_drink(&first.id), Some(first));
    assert!(menu.find_drink("nope").is_none());

    let ids: Vec<&str> = menu.toppings.iter().take(2).map(|t| t.id.as_str()).collect();
    assert_eq!(menu.resolve_toppings(ids).unwrap().len(), 2);
    assert_eq!(menu.resolve_toppings(["missing"]), Err("missing".to_string()));
  }

  #[test]
  fn newer_ticket_supersedes_older() {
    let sequencer = RequestSequencer::new();
    let first = sequencer.begin();
    assert!(sequencer.is_current(first));
    let second = sequencer.begin();
    assert!(!sequencer.is_current(first));
    assert!(sequencer.is_current(second));
    assert!(second > first);
  }
}
