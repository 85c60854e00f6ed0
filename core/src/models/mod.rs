// bobabble/src/models/mod.rs

//! Records exchanged with the remote store. Field names follow the store's
//! column names so rows deserialize directly.

pub mod catalog;
pub mod order;

pub use catalog::{CategoryFilter, Drink, DrinkCategory, MilkOption, SweetnessLevel, Topping};
pub use order::{Order, OrderItem, OrderItemTopping, OrderStatus, PaymentStatus};

/// Collection names in the remote store.
pub mod tables {
  pub const DRINKS: &str = "drinks";
  pub const TOPPINGS: &str = "toppings";
  pub const MILK_OPTIONS: &str = "milk_options";
  pub const SWEETNESS_LEVELS: &str = "sweetness_levels";
  pub const ORDERS: &str = "orders";
  pub const ORDER_ITEMS: &str = "order_items";
  pub const ORDER_ITEM_TOPPINGS: &str = "order_item_toppings";
}
