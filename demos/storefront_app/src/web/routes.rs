// storefront_app/src/web/routes.rs

use actix_web::web;

use crate::errors::AppError;
use crate::web::handlers::{cart_handlers, catalog_handlers, checkout_handlers, order_handlers, qr_handlers};

async fn health_check_handler(app_state: web::Data<crate::state::AppState>) -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({
      "status": "ok",
      "store_configured": app_state.orders.is_configured(),
      "sessions": app_state.sessions.len(),
  }))
}

/// Malformed JSON bodies get the same error shape as every other failure.
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .route("/sessions", web::post().to(cart_handlers::create_session_handler))
      // Catalog Routes
      .route("/menu", web::get().to(catalog_handlers::get_menu_handler))
      .route("/drinks", web::get().to(catalog_handlers::list_drinks_handler))
      .route("/drinks/popular", web::get().to(catalog_handlers::list_popular_drinks_handler))
      .route("/toppings", web::get().to(catalog_handlers::list_toppings_handler))
      .route("/milk-options", web::get().to(catalog_handlers::list_milk_options_handler))
      .route("/sweetness-levels", web::get().to(catalog_handlers::list_sweetness_levels_handler))
      // Cart Routes (keyed by the X-Session-Id header)
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::view_cart_handler))
          .route("", web::delete().to(cart_handlers::clear_cart_handler))
          .route("/items", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/items/{index}", web::patch().to(cart_handlers::update_cart_item_handler))
          .route("/items/{index}", web::delete().to(cart_handlers::remove_cart_item_handler)),
      )
      // Checkout Routes
      .route("/checkout", web::post().to(checkout_handlers::checkout_handler))
      // Order Routes
      .service(
        web::scope("/orders")
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}/items", web::get().to(order_handlers::get_order_items_handler))
          .route("/{order_id}/status", web::patch().to(order_handlers::update_order_status_handler))
          .route(
            "/{order_id}/payment-status",
            web::patch().to(order_handlers::update_payment_status_handler),
          )
          .route("/{order_id}/qr", web::get().to(order_handlers::download_order_qr_handler)),
      )
      // QR Routes
      .service(
        web::scope("/qr")
          .route("/generate", web::post().to(qr_handlers::generate_qr_handler))
          .route("/verify", web::post().to(qr_handlers::verify_qr_handler)),
      ),
  );
}
