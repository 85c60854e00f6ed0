// storefront_app/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use bobabble::{CartError, CatalogError, OrderError, QrError, SubmitError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Catalog Error: {0}")]
  Catalog(#[from] CatalogError),

  #[error("Order Error: {0}")]
  Order(#[from] OrderError),

  #[error("Checkout Error: {0}")]
  Submit(#[from] SubmitError),

  #[error("Cart Error: {0}")]
  Cart(#[from] CartError),

  #[error("QR Error: {0}")]
  Qr(#[from] QrError),
}

impl AppError {
  /// User-facing message, optional detail, and whether retrying can help.
  fn body(&self) -> (String, Option<String>, bool) {
    match self {
      AppError::Validation(m) => (m.clone(), None, false),
      AppError::NotFound(m) => (m.clone(), None, false),
      AppError::Config(m) => ("Configuration issue".to_string(), Some(m.clone()), false),
      AppError::Catalog(e) => ("Menu is unavailable".to_string(), Some(e.to_string()), true),
      AppError::Order(e) => order_body(e),
      AppError::Submit(SubmitError::EmptyCart) => (
        "Your cart is empty. Add a drink before checking out.".to_string(),
        None,
        false,
      ),
      AppError::Submit(SubmitError::AlreadySubmitting) => (
        "Your order is already being placed.".to_string(),
        None,
        true,
      ),
      AppError::Submit(SubmitError::Order(e)) => order_body(e),
      AppError::Cart(e) => (e.to_string(), None, false),
      AppError::Qr(e) if is_bad_qr_request(e) => (e.to_string(), None, false),
      AppError::Qr(e) => (
        "Could not generate the QR code. Please try again.".to_string(),
        Some(e.to_string()),
        true,
      ),
    }
  }
}

fn order_body(e: &OrderError) -> (String, Option<String>, bool) {
  match e {
    OrderError::NotConfigured => (
      "Ordering is unavailable: the store is not configured.".to_string(),
      None,
      false,
    ),
    OrderError::NotFound { order_id } => (format!("Order '{}' not found", order_id), None, false),
    OrderError::Store { .. } => ("Failed to place or read the order".to_string(), Some(e.to_string()), true),
  }
}

/// Render options the caller got wrong, as opposed to a failed render.
fn is_bad_qr_request(e: &QrError) -> bool {
  matches!(
    e,
    QrError::InvalidSize { .. } | QrError::InvalidColor(_) | QrError::InvalidQuality(_)
  )
}

fn order_status(e: &OrderError) -> StatusCode {
  match e {
    OrderError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
    OrderError::NotFound { .. } => StatusCode::NOT_FOUND,
    OrderError::Store { .. } => StatusCode::BAD_GATEWAY,
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::Cart(_) => StatusCode::BAD_REQUEST,
      AppError::Qr(e) if is_bad_qr_request(e) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Catalog(CatalogError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Catalog(CatalogError::Remote { .. }) => StatusCode::BAD_GATEWAY,
      AppError::Order(e) => order_status(e),
      AppError::Submit(SubmitError::EmptyCart) => StatusCode::BAD_REQUEST,
      AppError::Submit(SubmitError::AlreadySubmitting) => StatusCode::CONFLICT,
      AppError::Submit(SubmitError::Order(e)) => order_status(e),
      AppError::Config(_) | AppError::Qr(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    let (error, detail, retryable) = self.body();
    let mut body = json!({ "error": error, "retryable": retryable });
    if let Some(detail) = detail {
      body["detail"] = json!(detail);
    }
    HttpResponse::build(self.status_code()).json(body)
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
