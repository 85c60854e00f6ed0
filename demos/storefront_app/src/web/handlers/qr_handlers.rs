// storefront_app/src/web/handlers/qr_handlers.rs

use actix_web::{web, HttpResponse};
use bobabble::qr::{self, QrContent, RenderOptions};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;

#[derive(Deserialize, Debug)]
pub struct GenerateQrPayload {
  pub content: QrContent,
  #[serde(default)]
  pub options: Option<RenderOptions>,
}

#[derive(Deserialize, Debug)]
pub struct VerifyQrPayload {
  pub text: String,
}

#[instrument(name = "handler::generate_qr", skip(req_payload), fields(kind = req_payload.content.kind()))]
pub async fn generate_qr_handler(req_payload: web::Json<GenerateQrPayload>) -> Result<HttpResponse, AppError> {
  let GenerateQrPayload { content, options } = req_payload.into_inner();
  let options = options.unwrap_or_default();
  let image = qr::encode_generic(&content, &options)?;

  Ok(HttpResponse::Ok().json(json!({
      "kind": content.kind(),
      "payload": content.payload(),
      "mime": image.mime(),
      "width": image.width,
      "data_url": image.to_data_url(),
  })))
}

/// Checks scanned text. Anything that is not a well-formed order payload is
/// reported as `valid: false` rather than an error.
#[instrument(name = "handler::verify_qr", skip_all)]
pub async fn verify_qr_handler(req_payload: web::Json<VerifyQrPayload>) -> Result<HttpResponse, AppError> {
  let valid = qr::verify_order_payload(&req_payload.text);
  let order = qr::decode_order_payload(&req_payload.text);
  info!(valid, decoded = order.is_some(), "QR payload checked.");
  Ok(HttpResponse::Ok().json(json!({ "valid": valid, "order": order })))
}
