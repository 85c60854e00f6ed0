// storefront_app/src/web/handlers/order_handlers.rs

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use bobabble::qr::{self, OrderQrData};
use bobabble::{Menu, Order, OrderStatus, PaymentStatus};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::checkout_handlers::ImageFormatQuery;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct UpdateStatusPayload {
  pub status: OrderStatus,
}

#[derive(Deserialize, Debug)]
pub struct UpdatePaymentStatusPayload {
  pub payment_status: PaymentStatus,
}

async fn load_order(app_state: &AppState, order_id: &str) -> Result<Order, AppError> {
  app_state
    .orders
    .get_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order '{}' not found", order_id)))
}

#[instrument(name = "handler::get_order", skip(app_state), fields(order_id = %path))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order = load_order(&app_state, &path).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::get_order_items", skip(app_state), fields(order_id = %path))]
pub async fn get_order_items_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  let order = load_order(&app_state, &path).await?;
  let items = app_state.orders.get_order_items(&order.id).await?;
  Ok(HttpResponse::Ok().json(json!({ "order_id": order.id, "items": items })))
}

#[instrument(name = "handler::update_order_status", skip(app_state, req_payload), fields(order_id = %path, status = %req_payload.status))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  req_payload: web::Json<UpdateStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.orders.update_order_status(&path, req_payload.status).await?;
  info!("Order status updated.");
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(
    name = "handler::update_payment_status",
    skip(app_state, req_payload),
    fields(order_id = %path, payment_status = %req_payload.payment_status)
)]
pub async fn update_payment_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  req_payload: web::Json<UpdatePaymentStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .orders
    .update_payment_status(&path, req_payload.payment_status)
    .await?;
  info!("Payment status updated.");
  Ok(HttpResponse::Ok().json(order))
}

/// Re-renders a stored order's confirmation QR and serves it as a file
/// download.
#[instrument(name = "handler::download_order_qr", skip(app_state, query), fields(order_id = %path))]
pub async fn download_order_qr_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  query: web::Query<ImageFormatQuery>,
) -> Result<HttpResponse, AppError> {
  let format = query.image_format()?;
  let order = load_order(&app_state, &path).await?;
  let items = app_state.orders.get_order_items(&order.id).await?;
  let menu = Menu::load(&app_state.catalog).await?;

  let confirmation = qr::confirm(OrderQrData::from_stored(&order, &items, &menu), format)?;
  let file_name = confirmation.image.download_file_name(&order.id);

  Ok(
    HttpResponse::Ok()
      .content_type(confirmation.image.mime())
      .insert_header((
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", file_name),
      ))
      .body(confirmation.image.bytes),
  )
}
