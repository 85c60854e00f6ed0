// bobabble/src/pricing.rs

//! Unit price of a configured drink.

use crate::models::{Drink, MilkOption, Topping};
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to whole cents, ties away from zero (`2.345 -> 2.35`, `-2.345 -> -2.35`).
pub fn round2(amount: Decimal) -> Decimal {
  amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `round2(drink + Σ toppings + milk)`. Sweetness never contributes, so it is
/// not an input.
pub fn price(drink: &Drink, toppings: &[Topping], milk_option: &MilkOption) -> Decimal {
  let toppings_total: Decimal = toppings.iter().map(|t| t.price).sum();
  round2(drink.price + toppings_total + milk_option.price)
}
