// bobabble/src/cart/item.rs

use crate::models::{Drink, MilkOption, SweetnessLevel, Topping};
use crate::pricing;
use rust_decimal::Decimal;
use serde::Serialize;

/// One configured, priced line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
  pub drink: Drink,
  pub quantity: u32,
  pub toppings: Vec<Topping>,
  pub milk_option: MilkOption,
  pub sweetness_level: SweetnessLevel,
  /// Computed once at creation and rounded to cents.
  pub unit_price: Decimal,
}

/// Identity of a configuration. Two lines with equal keys are merged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigurationKey {
  pub drink_id: String,
  pub milk_option_id: String,
  pub sweetness_level_id: String,
  /// Sorted, so topping selection order never matters.
  pub topping_ids: Vec<String>,
}

impl CartItem {
  /// Builds a line, dropping repeated toppings (first occurrence wins) and
  /// pricing it with [`pricing::price`].
  pub fn new(
    drink: &Drink,
    toppings: &[Topping],
    milk_option: &MilkOption,
    sweetness_level: &SweetnessLevel,
    quantity: u32,
  ) -> Self {
    let mut unique: Vec<Topping> = Vec::with_capacity(toppings.len());
    for topping in toppings {
      if !unique.iter().any(|t| t.id == topping.id) {
        unique.push(topping.clone());
      }
    }
    let unit_price = pricing::price(drink, &unique, milk_option);

    Self {
      drink: drink.clone(),
      quantity,
      toppings: unique,
      milk_option: milk_option.clone(),
      sweetness_level: sweetness_level.clone(),
      unit_price,
    }
  }

  pub fn configuration_key(&self) -> ConfigurationKey {
    let mut topping_ids: Vec<String> = self.toppings.iter().map(|t| t.id.clone()).collect();
    topping_ids.sort();
    ConfigurationKey {
      drink_id: self.drink.id.clone(),
      milk_option_id: self.milk_option.id.clone(),
      sweetness_level_id: self.sweetness_level.id.clone(),
      topping_ids,
    }
  }

  pub fn is_configuration_equal(&self, other: &CartItem) -> bool {
    self.configuration_key() == other.configuration_key()
  }

  pub fn line_total(&self) -> Decimal {
    self.unit_price * Decimal::from(self.quantity)
  }

  pub fn topping_names(&self) -> Vec<String> {
    self.toppings.iter().map(|t| t.name.clone()).collect()
  }
}
