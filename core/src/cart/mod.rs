// bobabble/src/cart/mod.rs

//! The shopping cart state machine.
//!
//! [`Cart`] is the plain value with all the merge/quantity rules. [`CartStore`]
//! wraps it for sharing across async handlers and owns the checkout flow,
//! including the one-submission-at-a-time guard.

pub mod item;

pub use item::{CartItem, ConfigurationKey};

use crate::error::{CartError, SubmitError};
use crate::models::{Drink, MilkOption, Order, SweetnessLevel, Topping};
use crate::orders::{CreateOrderRequest, OrderGateway};
use crate::pricing;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, instrument, warn};

/// Ordered cart lines. Insertion order is display order and no two lines are
/// configuration-equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cart {
  items: Vec<CartItem>,
}

impl Cart {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds `quantity` of a configuration. Merges into an existing
  /// configuration-equal line if there is one, otherwise appends.
  /// Returns the index of the line that now holds the configuration.
  pub fn add_item(
    &mut self,
    drink: &Drink,
    toppings: &[Topping],
    milk_option: &MilkOption,
    sweetness_level: &SweetnessLevel,
    quantity: u32,
  ) -> Result<usize, CartError> {
    if quantity == 0 {
      return Err(CartError::InvalidQuantity(quantity));
    }

    let candidate = CartItem::new(drink, toppings, milk_option, sweetness_level, quantity);

    if let Some(index) = self.items.iter().position(|item| item.is_configuration_equal(&candidate)) {
      if let Some(existing) = self.items.get_mut(index) {
        existing.quantity = existing.quantity.saturating_add(quantity);
      }
      return Ok(index);
    }

    self.items.push(candidate);
    Ok(self.items.len() - 1)
  }

  /// Removes and returns the line at `index`.
  ///
  /// # Panics
  ///
  /// Panics if `index >= self.len()`. An invalid index is a caller bug; callers
  /// working from untrusted input check with [`Cart::get`] first.
  pub fn remove_item(&mut self, index: usize) -> CartItem {
    assert!(
      index < self.items.len(),
      "cart line index {} out of bounds (len {})",
      index,
      self.items.len()
    );
    self.items.remove(index)
  }

  /// Sets the quantity of the line at `index`, keeping its position.
  /// A quantity of zero or less removes the line.
  ///
  /// # Panics
  ///
  /// Panics if `index >= self.len()`, like [`Cart::remove_item`].
  pub fn update_quantity(&mut self, index: usize, new_quantity: i64) {
    if new_quantity <= 0 {
      self.remove_item(index);
      return;
    }
    let len = self.items.len();
    match self.items.get_mut(index) {
      Some(item) => item.quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX),
      None => panic!("cart line index {} out of bounds (len {})", index, len),
    }
  }

  pub fn clear(&mut self) {
    self.items.clear();
  }

  /// Takes the quantities of `ordered` back out of the matching lines and
  /// drops lines that reach zero. Lines with no ordered counterpart stay.
  pub fn remove_ordered(&mut self, ordered: &[CartItem]) {
    for placed in ordered {
      if let Some(line) = self.items.iter_mut().find(|item| item.is_configuration_equal(placed)) {
        line.quantity = line.quantity.saturating_sub(placed.quantity);
      }
    }
    self.items.retain(|item| item.quantity > 0);
  }

  pub fn items(&self) -> &[CartItem] {
    &self.items
  }

  pub fn get(&self, index: usize) -> Option<&CartItem> {
    self.items.get(index)
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Sum of quantities across all lines.
  pub fn total_items(&self) -> u64 {
    self.items.iter().map(|item| u64::from(item.quantity)).sum()
  }

  /// Σ unit price × quantity, rounded once to cents.
  pub fn total_price(&self) -> Decimal {
    pricing::round2(self.items.iter().map(CartItem::line_total).sum())
  }
}

/// Optional identity attached to an order at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
}

/// What a successful checkout hands back: the stored order and the lines it was
/// built from (already removed from the cart by then).
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedOrder {
  pub order: Order,
  pub items: Vec<CartItem>,
}

/// A cart shared between async tasks.
///
/// The lock is never held across an `.await`; `submit` snapshots the cart,
/// releases the lock, and only then calls the order gateway.
#[derive(Debug, Default)]
pub struct CartStore {
  cart: Mutex<Cart>,
  submitting: AtomicBool,
}

// Clears the in-flight flag on every exit path of `submit`.
struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
  fn acquire(flag: &'a AtomicBool) -> Option<Self> {
    flag
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .ok()
      .map(|_| SubmitGuard(flag))
  }
}

impl Drop for SubmitGuard<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

impl CartStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn snapshot(&self) -> Cart {
    self.cart.lock().clone()
  }

  /// Runs `f` with exclusive access to the cart. Use this to combine a bounds
  /// check with a mutation atomically.
  pub fn update<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> R {
    let mut cart = self.cart.lock();
    f(&mut cart)
  }

  pub fn add_item(
    &self,
    drink: &Drink,
    toppings: &[Topping],
    milk_option: &MilkOption,
    sweetness_level: &SweetnessLevel,
    quantity: u32,
  ) -> Result<usize, CartError> {
    self
      .cart
      .lock()
      .add_item(drink, toppings, milk_option, sweetness_level, quantity)
  }

  pub fn clear(&self) {
    self.cart.lock().clear();
  }

  pub fn total_items(&self) -> u64 {
    self.cart.lock().total_items()
  }

  pub fn total_price(&self) -> Decimal {
    self.cart.lock().total_price()
  }

  pub fn is_submitting(&self) -> bool {
    self.submitting.load(Ordering::Acquire)
  }

  /// Places the current cart as an order.
  ///
  /// - Rejects a concurrent second call with `AlreadySubmitting`.
  /// - Rejects an empty cart with `EmptyCart` before touching the store.
  /// - On success the submitted lines are taken out of the cart. Anything
  ///   added while the call was in flight stays for the next checkout.
  /// - On failure the cart is left as it was and the gateway error is returned
  ///   unchanged inside `SubmitError::Order`.
  #[instrument(name = "CartStore::submit", skip_all, err(Display))]
  pub async fn submit(
    &self,
    orders: &OrderGateway,
    customer: Option<CustomerInfo>,
  ) -> Result<SubmittedOrder, SubmitError> {
    let Some(_guard) = SubmitGuard::acquire(&self.submitting) else {
      warn!("Rejected checkout: a submission for this cart is already in flight.");
      return Err(SubmitError::AlreadySubmitting);
    };

    let request = {
      let cart = self.cart.lock();
      if cart.is_empty() {
        return Err(SubmitError::EmptyCart);
      }
      CreateOrderRequest::from_cart(&cart, customer.unwrap_or_default())
    };

    info!(
      lines = request.items.len(),
      total = %request.total_amount,
      "Submitting cart as order."
    );
    let order = orders.create_order(&request).await?;

    let remaining = {
      let mut cart = self.cart.lock();
      cart.remove_ordered(&request.items);
      cart.len()
    };
    info!(order_id = %order.id, remaining, "Order placed; submitted lines removed from cart.");

    Ok(SubmittedOrder {
      order,
      items: request.items,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::builtin;

  struct Menu {
    drinks: Vec<Drink>,
    toppings: Vec<Topping>,
    milks: Vec<MilkOption>,
    sweetness: Vec<SweetnessLevel>,
  }

  fn menu() -> Menu {
    Menu {
      drinks: builtin::drinks(),
      toppings: builtin::toppings(),
      milks: builtin::milk_options(),
      sweetness: builtin::sweetness_levels(),
    }
  }

  #[test]
  fn same_configuration_merges_into_one_line() {
    let m = menu();
    let mut cart = Cart::new();
    let first = cart.add_item(&m.drinks[0], &m.toppings[..1], &m.milks[0], &m.sweetness[2], 1).unwrap();
    let second = cart.add_item(&m.drinks[0], &m.toppings[..1], &m.milks[0], &m.sweetness[2], 2).unwrap();

    assert_eq!(first, second);
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.items()[0].quantity, 3);
  }

  #[test]
  fn topping_order_is_irrelevant_for_merging() {
    let m = menu();
    let a = m.toppings[0].clone();
    let b = m.toppings[1].clone();
    let mut cart = Cart::new();
    cart.add_item(&m.drinks[1], &[a.clone(), b.clone()], &m.milks[1], &m.sweetness[0], 1).unwrap();
    cart.add_item(&m.drinks[1], &[b, a], &m.milks[1], &m.sweetness[0], 1).unwrap();

    assert_eq!(cart.len(), 1);
    assert_eq!(cart.total_items(), 2);
  }

  #[test]
  fn different_sweetness_is_a_different_line() {
    let m = menu();
    let mut cart = Cart::new();
    cart.add_item(&m.drinks[0], &[], &m.milks[0], &m.sweetness[0], 1).unwrap();
    cart.add_item(&m.drinks[0], &[], &m.milks[0], &m.sweetness[4], 1).unwrap();
    assert_eq!(cart.len(), 2);
    // Sweetness is free, so both lines cost the same.
    assert_eq!(cart.items()[0].unit_price, cart.items()[1].unit_price);
  }

  #[test]
  fn duplicate_toppings_are_collapsed() {
    let m = menu();
    let pearls = m.toppings[0].clone();
    let mut cart = Cart::new();
    cart.add_item(&m.drinks[0], &[pearls.clone(), pearls], &m.milks[0], &m.sweetness[0], 1).unwrap();
    assert_eq!(cart.items()[0].toppings.len(), 1);
    assert_eq!(cart.items()[0].unit_price, m.drinks[0].price + m.toppings[0].price);
  }

  #[test]
  fn zero_quantity_add_is_rejected() {
    let m = menu();
    let mut cart = Cart::new();
    let result = cart.add_item(&m.drinks[0], &[], &m.milks[0], &m.sweetness[0], 0);
    assert_eq!(result, Err(CartError::InvalidQuantity(0)));
    assert!(cart.is_empty());
  }

  #[test]
  fn non_positive_quantity_update_removes_line() {
    let m = menu();
    for new_quantity in [0, -1] {
      let mut cart = Cart::new();
      cart.add_item(&m.drinks[0], &[], &m.milks[0], &m.sweetness[0], 1).unwrap();
      cart.add_item(&m.drinks[1], &[], &m.milks[0], &m.sweetness[0], 1).unwrap();
      cart.update_quantity(0, new_quantity);
      assert_eq!(cart.len(), 1);
      assert_eq!(cart.items()[0].drink.id, m.drinks[1].id);
    }
  }

  #[test]
  fn update_quantity_keeps_position() {
    let m = menu();
    let mut cart = Cart::new();
    cart.add_item(&m.drinks[0], &[], &m.milks[0], &m.sweetness[0], 1).unwrap();
    cart.add_item(&m.drinks[1], &[], &m.milks[0], &m.sweetness[0], 1).unwrap();
    cart.update_quantity(0, 5);
    assert_eq!(cart.items()[0].drink.id, m.drinks[0].id);
    assert_eq!(cart.items()[0].quantity, 5);
  }

  #[test]
  #[should_panic(expected = "out of bounds")]
  fn removing_missing_line_panics() {
    let mut cart = Cart::new();
    cart.remove_item(0);
  }

  #[test]
  fn totals_track_every_mutation() {
    let m = menu();
    let mut cart = Cart::new();
    let check = |cart: &Cart| {
      let expected: Decimal = cart.items().iter().map(|i| i.unit_price * Decimal::from(i.quantity)).sum();
      assert_eq!(cart.total_price(), expected);
      assert_eq!(cart.total_items(), cart.items().iter().map(|i| u64::from(i.quantity)).sum::<u64>());
    };

    cart.add_item(&m.drinks[2], &m.toppings[..3], &m.milks[4], &m.sweetness[1], 2).unwrap();
    check(&cart);
    cart.add_item(&m.drinks[5], &[], &m.milks[2], &m.sweetness[3], 1).unwrap();
    check(&cart);
    cart.update_quantity(1, 4);
    check(&cart);
    cart.remove_item(0);
    check(&cart);
    cart.clear();
    check(&cart);
    assert_eq!(cart.total_price(), Decimal::ZERO);
  }

  #[test]
  fn removing_ordered_lines_keeps_later_additions() {
    let m = menu();
    let mut cart = Cart::new();
    cart.add_item(&m.drinks[0], &m.toppings[..1], &m.milks[0], &m.sweetness[2], 2).unwrap();
    let ordered = cart.items().to_vec();

    cart.add_item(&m.drinks[0], &m.toppings[..1], &m.milks[0], &m.sweetness[2], 1).unwrap();
    cart.add_item(&m.drinks[3], &[], &m.milks[1], &m.sweetness[0], 1).unwrap();
    cart.remove_ordered(&ordered);

    assert_eq!(cart.len(), 2);
    assert_eq!(cart.items()[0].quantity, 1);
    assert_eq!(cart.items()[1].drink.id, m.drinks[3].id);

    let rest = cart.items().to_vec();
    cart.remove_ordered(&rest);
    assert!(cart.is_empty());
  }

  #[test]
  fn submit_guard_is_exclusive_and_released_on_drop() {
    let flag = AtomicBool::new(false);
    let guard = SubmitGuard::acquire(&flag);
    assert!(guard.is_some());
    assert!(SubmitGuard::acquire(&flag).is_none());
    drop(guard);
    assert!(SubmitGuard::acquire(&flag).is_some());
  }
}
