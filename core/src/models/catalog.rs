// bobabble/src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrinkCategory {
  MilkTea,
  Specialty,
  FruitTea,
  Tea,
  Smoothie,
}

impl DrinkCategory {
  pub const ALL: [DrinkCategory; 5] = [
    DrinkCategory::MilkTea,
    DrinkCategory::Specialty,
    DrinkCategory::FruitTea,
    DrinkCategory::Tea,
    DrinkCategory::Smoothie,
  ];

  /// The tag stored in the `category` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      DrinkCategory::MilkTea => "milk-tea",
      DrinkCategory::Specialty => "specialty",
      DrinkCategory::FruitTea => "fruit-tea",
      DrinkCategory::Tea => "tea",
      DrinkCategory::Smoothie => "smoothie",
    }
  }
}

impl fmt::Display for DrinkCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for DrinkCategory {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    DrinkCategory::ALL
      .into_iter()
      .find(|c| c.as_str() == s)
      .ok_or_else(|| format!("Unknown drink category '{}'", s))
  }
}

/// Category selector used by the menu browser; `"all"` means no filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
  All,
  Only(DrinkCategory),
}

impl FromStr for CategoryFilter {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s == "all" {
      return Ok(CategoryFilter::All);
    }
    s.parse().map(CategoryFilter::Only)
  }
}

impl From<DrinkCategory> for CategoryFilter {
  fn from(category: DrinkCategory) -> Self {
    CategoryFilter::Only(category)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drink {
  pub id: String,
  pub name: String,
  pub price: Decimal,
  pub category: DrinkCategory,
  #[serde(default)]
  pub popular: bool,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub image_url: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topping {
  pub id: String,
  pub name: String,
  pub price: Decimal,
  pub available: bool,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilkOption {
  pub id: String,
  pub name: String,
  pub price: Decimal,
  pub available: bool,
  pub created_at: DateTime<Utc>,
}

/// Sweetness carries no price; `level` is a percentage (0-100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweetnessLevel {
  pub id: String,
  pub name: String,
  pub level: u8,
  pub created_at: DateTime<Utc>,
}
