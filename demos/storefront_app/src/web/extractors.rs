// storefront_app/src/web/extractors.rs

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use tracing::warn;

use crate::errors::AppError;

pub const SESSION_HEADER: &str = "X-Session-Id";

/// The visitor's session id, taken from the `X-Session-Id` header.
/// `POST /api/v1/sessions` hands out fresh ids.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

impl FromRequest for SessionId {
  type Error = AppError;
  type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let id = req
      .headers()
      .get(SESSION_HEADER)
      .and_then(|value| value.to_str().ok())
      .map(str::trim)
      .filter(|value| !value.is_empty() && value.len() <= 128);

    match id {
      Some(id) => futures_util::future::ready(Ok(SessionId(id.to_string()))),
      None => {
        warn!("SessionId extractor: missing or invalid {} header.", SESSION_HEADER);
        futures_util::future::ready(Err(AppError::Validation(format!(
          "Missing or invalid {} header. Create a session with POST /api/v1/sessions.",
          SESSION_HEADER
        ))))
      }
    }
  }
}
