// bobabble/src/orders/mod.rs

//! Order persistence: one `orders` row, one `order_items` row per cart line,
//! one `order_item_toppings` row per topping on a line.

mod compensation;

use crate::cart::{Cart, CartItem, CustomerInfo};
use crate::error::OrderError;
use crate::models::{tables, Order, OrderItem, OrderItemTopping, OrderStatus, PaymentStatus};
use crate::store::{decode_row, decode_rows, row_id, Backend, Filter, Query, RecordStore};
use chrono::{SecondsFormat, Utc};
use compensation::WriteLog;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Everything needed to persist a checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrderRequest {
  pub customer_email: Option<String>,
  pub customer_name: Option<String>,
  pub items: Vec<CartItem>,
  pub total_amount: Decimal,
}

impl CreateOrderRequest {
  /// Snapshots the cart lines and the cart total.
  pub fn from_cart(cart: &Cart, customer: CustomerInfo) -> Self {
    Self {
      customer_email: customer.email,
      customer_name: customer.name,
      items: cart.items().to_vec(),
      total_amount: cart.total_price(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct OrderGateway {
  backend: Backend,
}

impl OrderGateway {
  pub fn new(backend: Backend) -> Self {
    Self { backend }
  }

  pub fn is_configured(&self) -> bool {
    self.backend.is_configured()
  }

  fn store(&self) -> Result<&Arc<dyn RecordStore>, OrderError> {
    self.backend.store().ok_or(OrderError::NotConfigured)
  }

  /// Writes the order, its lines and their toppings, in that order.
  ///
  /// If any write fails, every row written so far is deleted newest first
  /// and the failing write's error is returned. A failed cleanup delete is
  /// logged at ERROR and does not replace that error.
  #[instrument(
    name = "OrderGateway::create_order",
    skip_all,
    fields(lines = request.items.len(), total = %request.total_amount),
    err(Display)
  )]
  pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, OrderError> {
    let store = self.store()?;
    let mut log = WriteLog::new();

    match write_order(store.as_ref(), request, &mut log).await {
      Ok(order) => {
        info!(order_id = %order.id, rows = log.len(), "Order persisted.");
        Ok(order)
      }
      Err(e) => {
        warn!(rows = log.len(), error = %e, "Order write failed; removing rows written so far.");
        let leftovers = log.roll_back(store.as_ref()).await;
        if leftovers > 0 {
          error!(leftovers, "Order rollback incomplete.");
        }
        Err(e)
      }
    }
  }

  /// `None` when no order has this id.
  #[instrument(name = "OrderGateway::get_order", skip(self), err(Display))]
  pub async fn get_order(&self, order_id: &str) -> Result<Option<Order>, OrderError> {
    let store = self.store()?;
    let query = Query::from(tables::ORDERS).eq("id", order_id);
    let rows = match store.select(&query).await {
      Ok(rows) => rows,
      Err(e) if e.is_no_rows() => return Ok(None),
      Err(e) => return Err(OrderError::store("get_order")(e)),
    };

    match rows.into_iter().next() {
      Some(row) => decode_row(tables::ORDERS, row)
        .map(Some)
        .map_err(OrderError::store("get_order")),
      None => {
        debug!("No order with this id.");
        Ok(None)
      }
    }
  }

  /// Lines of an order in creation order, each with its topping ids.
  #[instrument(name = "OrderGateway::get_order_items", skip(self), err(Display))]
  pub async fn get_order_items(&self, order_id: &str) -> Result<Vec<OrderItem>, OrderError> {
    let store = self.store()?;
    let query = Query::from(tables::ORDER_ITEMS)
      .eq("order_id", order_id)
      .order_asc("created_at");
    let rows = store
      .select(&query)
      .await
      .map_err(OrderError::store("get_order_items"))?;
    let mut items: Vec<OrderItem> =
      decode_rows(tables::ORDER_ITEMS, rows).map_err(OrderError::store("get_order_items"))?;

    for item in items.iter_mut() {
      let query = Query::from(tables::ORDER_ITEM_TOPPINGS)
        .eq("order_item_id", item.id.as_str())
        .order_asc("created_at");
      let rows = store
        .select(&query)
        .await
        .map_err(OrderError::store("get_order_item_toppings"))?;
      let links: Vec<OrderItemTopping> =
        decode_rows(tables::ORDER_ITEM_TOPPINGS, rows).map_err(OrderError::store("get_order_item_toppings"))?;
      item.topping_ids = links.into_iter().map(|link| link.topping_id).collect();
    }

    Ok(items)
  }

  #[instrument(name = "OrderGateway::update_order_status", skip(self, status), fields(%status), err(Display))]
  pub async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<Order, OrderError> {
    self
      .patch_order(order_id, json!({ "status": status.as_str() }), "update_order_status")
      .await
  }

  #[instrument(name = "OrderGateway::update_payment_status", skip(self, payment_status), fields(%payment_status), err(Display))]
  pub async fn update_payment_status(
    &self,
    order_id: &str,
    payment_status: PaymentStatus,
  ) -> Result<Order, OrderError> {
    self
      .patch_order(
        order_id,
        json!({ "payment_status": payment_status.as_str() }),
        "update_payment_status",
      )
      .await
  }

  async fn patch_order(&self, order_id: &str, mut patch: Value, operation: &'static str) -> Result<Order, OrderError> {
    let store = self.store()?;
    if let Value::Object(fields) = &mut patch {
      fields.insert("updated_at".to_string(), Value::String(now_rfc3339()));
    }

    let rows = match store.update(tables::ORDERS, &[Filter::eq("id", order_id)], patch).await {
      Ok(rows) => rows,
      Err(e) if e.is_no_rows() => Vec::new(),
      Err(e) => return Err(OrderError::store(operation)(e)),
    };

    let Some(row) = rows.into_iter().next() else {
      return Err(OrderError::NotFound {
        order_id: order_id.to_string(),
      });
    };
    let order: Order = decode_row(tables::ORDERS, row).map_err(OrderError::store(operation))?;
    info!(order_id = %order.id, status = %order.status, payment_status = %order.payment_status, "Order updated.");
    Ok(order)
  }
}

fn now_rfc3339() -> String {
  Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Inserts and records one row, returning the stored representation.
async fn insert_logged(
  store: &dyn RecordStore,
  log: &mut WriteLog,
  table: &'static str,
  row: Value,
  operation: &'static str,
) -> Result<Value, OrderError> {
  let stored = store.insert(table, row).await.map_err(OrderError::store(operation))?;
  let id = row_id(table, &stored).map_err(OrderError::store(operation))?;
  log.record(table, id);
  Ok(stored)
}

async fn write_order(store: &dyn RecordStore, request: &CreateOrderRequest, log: &mut WriteLog) -> Result<Order, OrderError> {
  let order_row = json!({
    "customer_email": request.customer_email,
    "customer_name": request.customer_name,
    "total_amount": request.total_amount,
    "status": OrderStatus::Pending.as_str(),
    "payment_status": PaymentStatus::Pending.as_str(),
  });
  let stored = insert_logged(store, log, tables::ORDERS, order_row, "insert_order").await?;
  let order: Order = decode_row(tables::ORDERS, stored).map_err(OrderError::store("insert_order"))?;
  debug!(order_id = %order.id, "Order row written.");

  for item in &request.items {
    let item_row = json!({
      "order_id": order.id,
      "drink_id": item.drink.id,
      "quantity": item.quantity,
      "unit_price": item.unit_price,
      "milk_option_id": item.milk_option.id,
      "sweetness_level_id": item.sweetness_level.id,
    });
    let stored = insert_logged(store, log, tables::ORDER_ITEMS, item_row, "insert_order_item").await?;
    let item_id = row_id(tables::ORDER_ITEMS, &stored).map_err(OrderError::store("insert_order_item"))?;

    for topping in &item.toppings {
      let link_row = json!({
        "order_item_id": item_id,
        "topping_id": topping.id,
      });
      insert_logged(store, log, tables::ORDER_ITEM_TOPPINGS, link_row, "insert_order_item_topping").await?;
    }
  }

  Ok(order)
}
