// storefront_app/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use bobabble::{Cart, CartStore, Menu};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SessionId;

// --- Request/Response DTOs ---

#[derive(Deserialize, Debug)]
pub struct AddToCartRequestPayload {
  pub drink_id: String,
  #[serde(default)]
  pub topping_ids: Vec<String>,
  pub milk_option_id: String,
  pub sweetness_level_id: String,
  #[serde(default = "default_quantity")]
  pub quantity: u32,
}

fn default_quantity() -> u32 {
  1
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuantityPayload {
  /// Zero or less removes the line.
  pub quantity: i64,
}

#[derive(Serialize, Debug)]
pub struct CartView {
  #[serde(flatten)]
  pub cart: Cart,
  pub total_items: u64,
  pub total_price: Decimal,
  pub submitting: bool,
}

impl CartView {
  pub fn of(store: &CartStore) -> Self {
    let cart = store.snapshot();
    Self {
      total_items: cart.total_items(),
      total_price: cart.total_price(),
      submitting: store.is_submitting(),
      cart,
    }
  }
}

fn line_not_found(index: usize, len: usize) -> AppError {
  AppError::NotFound(format!("Cart line {} does not exist (cart has {} lines)", index, len))
}

// --- Handler Implementations ---

#[instrument(name = "handler::create_session", skip(app_state))]
pub async fn create_session_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let session_id = app_state.sessions.create();
  info!(session_id = %session_id, "Session created.");
  Ok(HttpResponse::Created().json(json!({ "session_id": session_id })))
}

#[instrument(name = "handler::view_cart", skip(app_state, session), fields(session_id = %session.0))]
pub async fn view_cart_handler(app_state: web::Data<AppState>, session: SessionId) -> Result<HttpResponse, AppError> {
  let session = app_state.sessions.require(&session.0)?;
  Ok(HttpResponse::Ok().json(CartView::of(&session.cart)))
}

/// Resolves the selected ids against the current menu and adds the
/// configuration, merging with an equal line if there is one.
#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload, session),
    fields(session_id = %session.0, drink_id = %req_payload.drink_id, quantity = %req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  session: SessionId,
) -> Result<HttpResponse, AppError> {
  let menu = Menu::load(&app_state.catalog).await?;

  let drink = menu
    .find_drink(&req_payload.drink_id)
    .ok_or_else(|| AppError::Validation(format!("Unknown drink '{}'", req_payload.drink_id)))?;
  let milk_option = menu
    .find_milk_option(&req_payload.milk_option_id)
    .ok_or_else(|| AppError::Validation(format!("Unknown milk option '{}'", req_payload.milk_option_id)))?;
  let sweetness_level = menu
    .find_sweetness_level(&req_payload.sweetness_level_id)
    .ok_or_else(|| AppError::Validation(format!("Unknown sweetness level '{}'", req_payload.sweetness_level_id)))?;
  let toppings = menu
    .resolve_toppings(req_payload.topping_ids.iter().map(String::as_str))
    .map_err(|id| AppError::Validation(format!("Unknown topping '{}'", id)))?;

  let session = app_state.sessions.require(&session.0)?;
  let index = session
    .cart
    .add_item(drink, &toppings, milk_option, sweetness_level, req_payload.quantity)?;

  let view = CartView::of(&session.cart);
  info!(
    index,
    lines = view.cart.len(),
    total = %view.total_price,
    "Item added to cart."
  );
  Ok(HttpResponse::Ok().json(json!({ "index": index, "cart": view })))
}

#[instrument(
    name = "handler::update_cart_item",
    skip(app_state, req_payload, session),
    fields(session_id = %session.0, index = %path, quantity = %req_payload.quantity)
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<usize>,
  req_payload: web::Json<UpdateQuantityPayload>,
  session: SessionId,
) -> Result<HttpResponse, AppError> {
  let index = path.into_inner();
  let session = app_state.sessions.require(&session.0)?;
  session.cart.update(|cart| {
    if cart.get(index).is_none() {
      return Err(line_not_found(index, cart.len()));
    }
    cart.update_quantity(index, req_payload.quantity);
    Ok(())
  })?;
  Ok(HttpResponse::Ok().json(CartView::of(&session.cart)))
}

#[instrument(
    name = "handler::remove_cart_item",
    skip(app_state, session),
    fields(session_id = %session.0, index = %path)
)]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<usize>,
  session: SessionId,
) -> Result<HttpResponse, AppError> {
  let index = path.into_inner();
  let session = app_state.sessions.require(&session.0)?;
  let removed = session.cart.update(|cart| {
    if cart.get(index).is_none() {
      return Err(line_not_found(index, cart.len()));
    }
    Ok(cart.remove_item(index))
  })?;
  info!(drink = %removed.drink.name, "Cart line removed.");
  Ok(HttpResponse::Ok().json(CartView::of(&session.cart)))
}

#[instrument(name = "handler::clear_cart", skip(app_state, session), fields(session_id = %session.0))]
pub async fn clear_cart_handler(app_state: web::Data<AppState>, session: SessionId) -> Result<HttpResponse, AppError> {
  let session = app_state.sessions.require(&session.0)?;
  if session.cart.is_submitting() {
    warn!("Clearing cart while a checkout is in flight.");
  }
  session.cart.clear();
  Ok(HttpResponse::Ok().json(CartView::of(&session.cart)))
}
