// bobabble/src/error.rs
use thiserror::Error;

/// Failures reported by a `RecordStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("HTTP transport error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Remote store returned {status} (code: {code:?}): {message}")]
  Remote {
    status: u16,
    code: Option<String>,
    message: String,
  },

  /// The lookup matched no row. PostgREST reports this as `PGRST116`.
  #[error("No matching row in '{table}'")]
  NoRows { table: String },

  #[error("Failed to decode '{table}' row: {source}")]
  Decode {
    table: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("Row for '{table}' is not a JSON object")]
  NotAnObject { table: String },

  #[error("Row returned by '{table}' has no usable 'id' column")]
  MissingId { table: String },

  /// Raised by `MemoryStore` when a failure was injected for the call.
  #[error("Injected failure on {verb} '{table}'")]
  Injected { table: String, verb: String },
}

impl StoreError {
  pub fn is_no_rows(&self) -> bool {
    matches!(self, StoreError::NoRows { .. })
  }
}

/// Only produced under `FallbackPolicy::Surface`; the default policy swaps in built-in data.
#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("Remote store is not configured")]
  NotConfigured,

  #[error("Catalog read from '{table}' failed: {source}")]
  Remote {
    table: String,
    #[source]
    source: StoreError,
  },
}

#[derive(Debug, Error)]
pub enum OrderError {
  #[error("Remote store is not configured; orders require a real backing store")]
  NotConfigured,

  #[error("Order not found: {order_id}")]
  NotFound { order_id: String },

  #[error("Order store operation '{operation}' failed: {source}")]
  Store {
    operation: &'static str,
    #[source]
    source: StoreError,
  },
}

impl OrderError {
  pub(crate) fn store(operation: &'static str) -> impl FnOnce(StoreError) -> OrderError {
    move |source| OrderError::Store { operation, source }
  }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
  #[error("Quantity must be at least 1 (got {0})")]
  InvalidQuantity(u32),
}

#[derive(Debug, Error)]
pub enum SubmitError {
  #[error("Cart is empty")]
  EmptyCart,

  #[error("An order submission for this cart is already in flight")]
  AlreadySubmitting,

  /// The order gateway error, passed through unchanged.
  #[error(transparent)]
  Order(#[from] OrderError),
}

#[derive(Debug, Error)]
pub enum QrError {
  #[error("Payload does not fit a QR symbol at error correction level {level}: {source}")]
  Encode {
    level: char,
    #[source]
    source: qrcode::types::QrError,
  },

  #[error("Invalid color '{0}', expected #RRGGBB or #RRGGBBAA")]
  InvalidColor(String),

  #[error("Quality must be within 0.0..=1.0 (got {0})")]
  InvalidQuality(f32),

  #[error("Invalid {field} {value}, at most {max} allowed")]
  InvalidSize {
    field: &'static str,
    value: u32,
    max: u32,
  },

  #[error("Failed to encode raster image: {0}")]
  Image(#[from] image::ImageError),

  #[error("Failed to serialize order payload: {0}")]
  Serialize(#[from] serde_json::Error),
}
