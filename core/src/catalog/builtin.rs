// bobabble/src/catalog/builtin.rs

//! The demo menu served when the remote store is unavailable. Mirrors the live
//! schema and category vocabulary so the rest of the storefront cannot tell
//! the difference (which is exactly why every use of it is logged).

use crate::models::{Drink, DrinkCategory, MilkOption, SweetnessLevel, Topping};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

// Fixed so fallback data is reproducible across runs (2024-01-01T00:00:00Z).
fn seeded_at() -> DateTime<Utc> {
  DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default()
}

fn cents(value: i64) -> Decimal {
  Decimal::new(value, 2)
}

fn drink(id: &str, name: &str, price: i64, category: DrinkCategory, popular: bool, description: &str) -> Drink {
  Drink {
    id: id.to_string(),
    name: name.to_string(),
    price: cents(price),
    category,
    popular,
    description: Some(description.to_string()),
    image_url: None,
    created_at: seeded_at(),
    updated_at: seeded_at(),
  }
}

pub fn drinks() -> Vec<Drink> {
  use DrinkCategory::*;
  vec![
    drink("1", "Classic Milk Tea", 450, MilkTea, true, "Traditional milk tea with a perfect balance of tea and milk"),
    drink("2", "Taro Milk Tea", 500, MilkTea, true, "Creamy taro-flavored milk tea with a beautiful purple color"),
    drink("3", "Thai Tea", 475, MilkTea, false, "Rich and creamy Thai-style tea with condensed milk"),
    drink("4", "Matcha Latte", 525, Specialty, true, "Premium Japanese matcha with steamed milk"),
    drink("5", "Brown Sugar Milk Tea", 550, MilkTea, false, "Rich brown sugar syrup with fresh milk and tea"),
    drink("6", "Honeydew Smoothie", 425, Smoothie, false, "Refreshing honeydew melon smoothie"),
    drink("7", "Mango Green Tea", 400, FruitTea, false, "Fresh mango flavor with green tea base"),
    drink("8", "Passion Fruit Tea", 400, FruitTea, false, "Tropical passion fruit with tea"),
    drink("9", "Jasmine Green Tea", 350, Tea, false, "Fragrant jasmine green tea"),
    drink("10", "Oolong Tea", 375, Tea, false, "Traditional oolong tea"),
  ]
}

pub fn toppings() -> Vec<Topping> {
  [
    ("1", "Tapioca Pearls", 50),
    ("2", "Popping Boba", 60),
    ("3", "Jelly", 50),
    ("4", "Pudding", 70),
    ("5", "Red Bean", 60),
    ("6", "Taro Balls", 65),
  ]
  .into_iter()
  .map(|(id, name, price)| Topping {
    id: id.to_string(),
    name: name.to_string(),
    price: cents(price),
    available: true,
    created_at: seeded_at(),
  })
  .collect()
}

pub fn milk_options() -> Vec<MilkOption> {
  [
    ("1", "Regular Milk", 0),
    ("2", "Oat Milk", 50),
    ("3", "Almond Milk", 50),
    ("4", "Coconut Milk", 50),
    ("5", "Soy Milk", 40),
  ]
  .into_iter()
  .map(|(id, name, price)| MilkOption {
    id: id.to_string(),
    name: name.to_string(),
    price: cents(price),
    available: true,
    created_at: seeded_at(),
  })
  .collect()
}

pub fn sweetness_levels() -> Vec<SweetnessLevel> {
  [
    ("1", "0% (No Sugar)", 0),
    ("2", "25% (Less Sweet)", 25),
    ("3", "50% (Half Sweet)", 50),
    ("4", "75% (Regular)", 75),
    ("5", "100% (Extra Sweet)", 100),
  ]
  .into_iter()
  .map(|(id, name, level)| SweetnessLevel {
    id: id.to_string(),
    name: name.to_string(),
    level,
    created_at: seeded_at(),
  })
  .collect()
}
