// storefront_app/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use bobabble::qr::{self, ImageFormat, OrderConfirmation};
use bobabble::CustomerInfo;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SessionId;

#[derive(Deserialize, Debug, Default)]
pub struct ImageFormatQuery {
  #[serde(default)]
  pub format: Option<String>,
}

impl ImageFormatQuery {
  pub fn image_format(&self) -> Result<ImageFormat, AppError> {
    match self.format.as_deref() {
      Some(raw) => raw.parse().map_err(AppError::Validation),
      None => Ok(ImageFormat::Png),
    }
  }
}

/// Inline form of a confirmation QR.
#[derive(Serialize, Debug)]
pub struct QrView {
  pub variant: qr::ConfirmationVariant,
  pub mime: &'static str,
  pub width: u32,
  pub data_url: String,
  pub download_url: String,
  pub verification: String,
}

impl QrView {
  pub fn of(confirmation: &OrderConfirmation) -> Self {
    let image = &confirmation.image;
    Self {
      variant: confirmation.variant,
      mime: image.mime(),
      width: image.width,
      data_url: image.to_data_url(),
      download_url: format!(
        "/api/v1/orders/{}/qr?format={}",
        confirmation.data.order_id, image.format
      ),
      verification: confirmation.data.verification(),
    }
  }
}

/// Places the session's cart as an order and returns it with its
/// confirmation QR. A QR failure does not undo the order: the response then
/// carries `qr: null` and the client retries through the download route.
#[instrument(name = "handler::checkout", skip(app_state, session, customer), fields(session_id = %session.0))]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  session: SessionId,
  query: web::Query<ImageFormatQuery>,
  customer: Option<web::Json<CustomerInfo>>,
) -> Result<HttpResponse, AppError> {
  let format = query.image_format()?;
  let session = app_state.sessions.require(&session.0)?;

  let submitted = session
    .cart
    .submit(&app_state.orders, customer.map(web::Json::into_inner))
    .await?;
  info!(order_id = %submitted.order.id, "Checkout completed.");

  let (qr, qr_error) = match qr::confirm_order(&submitted.order, &submitted.items, format) {
    Ok(confirmation) => (Some(QrView::of(&confirmation)), None),
    Err(e) => {
      error!(order_id = %submitted.order.id, error = %e, "Order placed but its QR could not be generated.");
      (None, Some(e.to_string()))
    }
  };

  Ok(HttpResponse::Created().json(json!({
      "order": submitted.order,
      "items": submitted.items,
      "qr": qr,
      "qr_error": qr_error,
  })))
}
