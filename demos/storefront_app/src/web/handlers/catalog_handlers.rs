// storefront_app/src/web/handlers/catalog_handlers.rs

use actix_web::{web, HttpResponse};
use bobabble::{CategoryFilter, Menu};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SessionId;

#[derive(Deserialize, Debug)]
pub struct DrinksQuery {
  #[serde(default)]
  pub category: Option<String>,
}

#[instrument(name = "handler::get_menu", skip(app_state))]
pub async fn get_menu_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let menu = Menu::load(&app_state.catalog).await?;
  Ok(HttpResponse::Ok().json(menu))
}

/// Lists drinks, optionally filtered by `?category=`. With a known session
/// header the response carries `stale: true` when a newer browse from the same
/// session started while this one was in flight. Unknown ids browse anonymously.
#[instrument(name = "handler::list_drinks", skip(app_state, session), fields(category = ?query.category))]
pub async fn list_drinks_handler(
  app_state: web::Data<AppState>,
  query: web::Query<DrinksQuery>,
  session: Option<SessionId>,
) -> Result<HttpResponse, AppError> {
  let category = match query.category.as_deref() {
    Some(raw) => raw.parse::<CategoryFilter>().map_err(AppError::Validation)?,
    None => CategoryFilter::All,
  };

  let browse = session.and_then(|id| app_state.sessions.get(&id.0));
  let ticket = browse.as_ref().map(|s| s.browse.begin());

  let drinks = app_state.catalog.get_drinks_by_category(category).await?;

  let stale = match (&browse, ticket) {
    (Some(session), Some(ticket)) => !session.browse.is_current(ticket),
    _ => false,
  };
  if stale {
    debug!("Drink listing superseded by a newer browse.");
  }

  Ok(HttpResponse::Ok().json(json!({ "drinks": drinks, "stale": stale })))
}

#[instrument(name = "handler::list_popular_drinks", skip(app_state))]
pub async fn list_popular_drinks_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let drinks = app_state.catalog.get_popular_drinks().await?;
  Ok(HttpResponse::Ok().json(json!({ "drinks": drinks })))
}

#[instrument(name = "handler::list_toppings", skip(app_state))]
pub async fn list_toppings_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let toppings = app_state.catalog.get_toppings().await?;
  Ok(HttpResponse::Ok().json(json!({ "toppings": toppings })))
}

#[instrument(name = "handler::list_milk_options", skip(app_state))]
pub async fn list_milk_options_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let milk_options = app_state.catalog.get_milk_options().await?;
  Ok(HttpResponse::Ok().json(json!({ "milk_options": milk_options })))
}

#[instrument(name = "handler::list_sweetness_levels", skip(app_state))]
pub async fn list_sweetness_levels_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let sweetness_levels = app_state.catalog.get_sweetness_levels().await?;
  Ok(HttpResponse::Ok().json(json!({ "sweetness_levels": sweetness_levels })))
}
