// bobabble/src/qr/payload.rs

//! The order confirmation payload: a JSON document with a fixed field layout
//! that scanners use to recover and check an order.

use super::checksum::verification_hash;
use crate::cart::CartItem;
use crate::error::QrError;
use crate::models::{Order, OrderItem};
use crate::session::Menu;
use chrono::SecondsFormat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Value of the payload's `type` field.
pub const ORDER_PAYLOAD_TYPE: &str = "BOBABBLE_ORDER";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCustomizations {
  #[serde(default)]
  pub milk_option: String,
  #[serde(default)]
  pub sweetness_level: String,
  #[serde(default)]
  pub toppings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQrItem {
  pub drink_name: String,
  pub quantity: u32,
  #[serde(default)]
  pub customizations: ItemCustomizations,
}

impl From<&CartItem> for OrderQrItem {
  fn from(item: &CartItem) -> Self {
    Self {
      drink_name: item.drink.name.clone(),
      quantity: item.quantity,
      customizations: ItemCustomizations {
        milk_option: item.milk_option.name.clone(),
        sweetness_level: item.sweetness_level.name.clone(),
        toppings: item.topping_names(),
      },
    }
  }
}

/// The order fields carried by a confirmation QR.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQrData {
  pub order_id: String,
  pub customer_name: Option<String>,
  pub customer_email: Option<String>,
  pub total_amount: Decimal,
  /// The order's `created_at` re-rendered as RFC 3339 UTC with millisecond
  /// precision and a `Z` suffix, e.g. `2024-05-01T12:00:00.123Z`. Not the raw
  /// stored column: a store that keeps microseconds or `+00:00` differs from
  /// this string. Part of the checksum input, so verifiers hash this field.
  pub timestamp: String,
  pub items: Vec<OrderQrItem>,
}

impl OrderQrData {
  /// Builds the payload data for a freshly placed order and the lines it was
  /// placed with.
  pub fn from_order(order: &Order, items: &[CartItem]) -> Self {
    Self {
      order_id: order.id.clone(),
      customer_name: order.customer_name.clone(),
      customer_email: order.customer_email.clone(),
      total_amount: order.total_amount,
      timestamp: order.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
      items: items.iter().map(OrderQrItem::from).collect(),
    }
  }

  /// Rebuilds the payload data for a stored order, naming each line's drink
  /// and options from `menu`. Ids missing from the menu are carried as-is.
  pub fn from_stored(order: &Order, items: &[OrderItem], menu: &Menu) -> Self {
    let items = items
      .iter()
      .map(|item| {
        let id_or = |id: Option<&str>, name: Option<&str>| name.or(id).unwrap_or_default().to_string();
        OrderQrItem {
          drink_name: id_or(Some(&item.drink_id), menu.find_drink(&item.drink_id).map(|d| d.name.as_str())),
          quantity: item.quantity,
          customizations: ItemCustomizations {
            milk_option: id_or(
              item.milk_option_id.as_deref(),
              item
                .milk_option_id
                .as_deref()
                .and_then(|id| menu.find_milk_option(id))
                .map(|m| m.name.as_str()),
            ),
            sweetness_level: id_or(
              item.sweetness_level_id.as_deref(),
              item
                .sweetness_level_id
                .as_deref()
                .and_then(|id| menu.find_sweetness_level(id))
                .map(|s| s.name.as_str()),
            ),
            toppings: item
              .topping_ids
              .iter()
              .map(|id| menu.find_topping(id).map_or_else(|| id.clone(), |t| t.name.clone()))
              .collect(),
          },
        }
      })
      .collect();

    Self {
      order_id: order.id.clone(),
      customer_name: order.customer_name.clone(),
      customer_email: order.customer_email.clone(),
      total_amount: order.total_amount,
      timestamp: order.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
      items,
    }
  }

  pub fn verification(&self) -> String {
    verification_hash(&self.order_id, &self.timestamp)
  }
}

// Wire shape. Field declaration order is the JSON key order.

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireCustomer {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  email: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireOrder {
  #[serde(default)]
  total: Decimal,
  #[serde(default)]
  timestamp: String,
  #[serde(default)]
  items: Vec<OrderQrItem>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload {
  #[serde(rename = "type")]
  kind: String,
  order_id: String,
  #[serde(default)]
  customer: WireCustomer,
  #[serde(default)]
  order: WireOrder,
  #[serde(default)]
  verification: Option<String>,
}

impl WirePayload {
  fn parse(text: &str) -> Option<Self> {
    match serde_json::from_str::<WirePayload>(text) {
      Ok(wire) if wire.kind == ORDER_PAYLOAD_TYPE => Some(wire),
      Ok(wire) => {
        tracing::debug!(kind = %wire.kind, "QR payload is not an order payload.");
        None
      }
      Err(e) => {
        tracing::debug!(error = %e, "QR payload is not valid order JSON.");
        None
      }
    }
  }
}

/// Serializes `data` into the payload text, checksum included.
pub fn encode_order_payload_text(data: &OrderQrData) -> Result<String, QrError> {
  let wire = WirePayload {
    kind: ORDER_PAYLOAD_TYPE.to_string(),
    order_id: data.order_id.clone(),
    customer: WireCustomer {
      name: data.customer_name.clone(),
      email: data.customer_email.clone(),
    },
    order: WireOrder {
      total: data.total_amount,
      timestamp: data.timestamp.clone(),
      items: data.items.clone(),
    },
    verification: Some(data.verification()),
  };
  Ok(serde_json::to_string(&wire)?)
}

/// Recovers order data from scanned text. `None` if the text is not JSON or
/// not an order payload; absent optional fields take their defaults.
pub fn decode_order_payload(text: &str) -> Option<OrderQrData> {
  let wire = WirePayload::parse(text)?;
  Some(OrderQrData {
    order_id: wire.order_id,
    customer_name: wire.customer.name,
    customer_email: wire.customer.email,
    total_amount: wire.order.total,
    timestamp: wire.order.timestamp,
    items: wire.order.items,
  })
}

/// True only for an order payload whose `verification` matches its
/// `orderId` and `order.timestamp`.
pub fn verify_order_payload(text: &str) -> bool {
  let Some(wire) = WirePayload::parse(text) else {
    return false;
  };
  let expected = verification_hash(&wire.order_id, &wire.order.timestamp);
  wire.verification.as_deref() == Some(expected.as_str())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::{json, Value};

  fn sample() -> OrderQrData {
    OrderQrData {
      order_id: "ord-1".to_string(),
      customer_name: Some("Mina".to_string()),
      customer_email: None,
      total_amount: Decimal::new(1500, 2),
      timestamp: "2024-05-01T12:00:00.000Z".to_string(),
      items: vec![OrderQrItem {
        drink_name: "Classic Milk Tea".to_string(),
        quantity: 3,
        customizations: ItemCustomizations {
          milk_option: "Regular Milk".to_string(),
          sweetness_level: "50% Sweet".to_string(),
          toppings: vec!["Tapioca Pearls".to_string()],
        },
      }],
    }
  }

  #[test]
  fn layout_has_fixed_keys_and_omits_absent_customer_fields() {
    let text = encode_order_payload_text(&sample()).unwrap();
    assert!(text.starts_with(r#"{"type":"BOBABBLE_ORDER","orderId":"ord-1","customer":{"name":"Mina"},"order":{"#));

    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["verification"], "9D0BDCB");
    assert_eq!(value["order"]["timestamp"], "2024-05-01T12:00:00.000Z");
    assert_eq!(value["order"]["items"][0]["customizations"]["milkOption"], "Regular Milk");
    assert_eq!(value["order"]["total"].as_f64(), Some(15.0));
    assert!(value["customer"].get("email").is_none());
  }

  #[test]
  fn decode_defaults_missing_optional_fields() {
    let text = json!({"type": "BOBABBLE_ORDER", "orderId": "x"}).to_string();
    let data = decode_order_payload(&text).unwrap();
    assert_eq!(data.order_id, "x");
    assert_eq!(data.customer_name, None);
    assert_eq!(data.customer_email, None);
    assert_eq!(data.total_amount, Decimal::ZERO);
    assert_eq!(data.timestamp, "");
    assert!(data.items.is_empty());
  }

  #[test]
  fn decode_rejects_other_types_and_garbage() {
    assert!(decode_order_payload(r#"{"type":"SOMETHING_ELSE","orderId":"x"}"#).is_none());
    assert!(decode_order_payload("ord-1").is_none());
    assert!(decode_order_payload("").is_none());
  }

  #[test]
  fn verify_round_trip_and_tamper() {
    let text = encode_order_payload_text(&sample()).unwrap();
    assert!(verify_order_payload(&text));

    let tampered = text.replace("\"orderId\":\"ord-1\"", "\"orderId\":\"ord-2\"");
    assert!(!verify_order_payload(&tampered));
    assert!(!verify_order_payload("not json"));
    assert!(!verify_order_payload(r#"{"type":"BOBABBLE_ORDER","orderId":"ord-1"}"#));
  }

  #[test]
  fn timestamp_is_created_at_at_millisecond_precision() {
    use crate::models::{OrderStatus, PaymentStatus};
    use chrono::{DateTime, Utc};

    let created_at: DateTime<Utc> = "2024-05-01T12:00:00.123456+00:00".parse().unwrap();
    let order = Order {
      id: "ord-1".to_string(),
      customer_email: None,
      customer_name: None,
      total_amount: Decimal::new(500, 2),
      status: OrderStatus::Pending,
      payment_status: PaymentStatus::Pending,
      created_at,
      updated_at: created_at,
    };

    let data = OrderQrData::from_order(&order, &[]);
    assert_eq!(data.timestamp, "2024-05-01T12:00:00.123Z");
    assert_eq!(data.verification(), verification_hash("ord-1", "2024-05-01T12:00:00.123Z"));
  }
}
