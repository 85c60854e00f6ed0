// bobabble/src/qr/mod.rs

//! QR codes: the self-verifying order confirmation payload, general-purpose
//! payload templates, and raster rendering.

pub mod checksum;
pub mod content;
pub mod payload;
pub mod render;

pub use checksum::verification_hash;
pub use content::{ContactContent, EmailContent, EventContent, QrContent, SmsContent, WifiContent, WifiSecurity};
pub use payload::{
  decode_order_payload, encode_order_payload_text, verify_order_payload, ItemCustomizations, OrderQrData, OrderQrItem,
  ORDER_PAYLOAD_TYPE,
};
pub use render::{render, ErrorCorrection, ImageFormat, QrColors, RasterImage, RenderOptions, MAX_MARGIN, MAX_WIDTH};

use crate::cart::CartItem;
use crate::error::QrError;
use crate::models::Order;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

/// Renders the full order payload.
#[instrument(name = "qr::encode_order", skip_all, fields(order_id = %data.order_id), err(Display))]
pub fn encode_order(data: &OrderQrData, options: &RenderOptions) -> Result<RasterImage, QrError> {
  let text = encode_order_payload_text(data)?;
  render(&text, options)
}

#[instrument(name = "qr::encode_generic", skip_all, fields(kind = content.kind()), err(Display))]
pub fn encode_generic(content: &QrContent, options: &RenderOptions) -> Result<RasterImage, QrError> {
  render(&content.payload(), options)
}

/// Which payload a confirmation QR ended up carrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationVariant {
  /// The full `BOBABBLE_ORDER` JSON payload.
  Full,
  /// Only the order id, used when the full payload could not be rendered.
  OrderIdOnly,
}

#[derive(Debug, Clone)]
pub struct OrderConfirmation {
  pub variant: ConfirmationVariant,
  pub data: OrderQrData,
  pub image: RasterImage,
}

/// Builds the confirmation QR for a placed order and the lines it was placed
/// with. See [`confirm`].
pub fn confirm_order(order: &Order, items: &[CartItem], format: ImageFormat) -> Result<OrderConfirmation, QrError> {
  confirm(OrderQrData::from_order(order, items), format)
}

/// Tries the full payload with [`RenderOptions::order_confirmation`]; if that
/// fails (typically a payload too large for level H) it renders the bare
/// order id with [`RenderOptions::simple_order`]. Only when both fail is an
/// error returned, and it is the fallback's error.
#[instrument(name = "qr::confirm", skip_all, fields(order_id = %data.order_id, %format))]
pub fn confirm(data: OrderQrData, format: ImageFormat) -> Result<OrderConfirmation, QrError> {
  match encode_order(&data, &RenderOptions::order_confirmation().with_format(format)) {
    Ok(image) => {
      info!("Order confirmation QR generated.");
      return Ok(OrderConfirmation {
        variant: ConfirmationVariant::Full,
        data,
        image,
      });
    }
    Err(e) => warn!(error = %e, "Full order QR failed; falling back to order id only."),
  }

  let fallback = QrContent::Text(data.order_id.clone());
  match encode_generic(&fallback, &RenderOptions::simple_order().with_format(format)) {
    Ok(image) => Ok(OrderConfirmation {
      variant: ConfirmationVariant::OrderIdOnly,
      data,
      image,
    }),
    Err(e) => {
      error!(error = %e, "Fallback order QR failed too.");
      Err(e)
    }
  }
}
