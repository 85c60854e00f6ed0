// bobabble/examples/order_confirmation.rs

use bobabble::qr::{self, ImageFormat};
use bobabble::{Backend, CartStore, CatalogGateway, CustomerInfo, MemoryStore, Menu, OrderGateway};
use tracing::info;

// Walks one order from menu to confirmation QR against an in-process store,
// then writes the QR next to the current directory.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Order Confirmation Example ---");

  // 1. Catalog: no remote store configured, so the built-in menu is served.
  let menu = Menu::load(&CatalogGateway::new(Backend::Unconfigured)).await?;

  // 2. Orders go to a memory store standing in for the hosted one.
  let orders = OrderGateway::new(Backend::with_store(MemoryStore::new()));

  // 3. Build a cart: two classic milk teas with pearls, one matcha with oat milk.
  let cart = CartStore::new();
  let classic = menu.find_drink("1").ok_or_else(|| anyhow::anyhow!("drink 1 missing"))?;
  let matcha = menu.find_drink("4").ok_or_else(|| anyhow::anyhow!("drink 4 missing"))?;
  let pearls = menu.resolve_toppings(["1"]).map_err(|id| anyhow::anyhow!("topping {id} missing"))?;
  let regular = &menu.milk_options[0];
  let oat = menu.find_milk_option("2").ok_or_else(|| anyhow::anyhow!("milk 2 missing"))?;
  let half = menu.find_sweetness_level("3").ok_or_else(|| anyhow::anyhow!("sweetness 3 missing"))?;

  cart.add_item(classic, &pearls, regular, half, 2)?;
  cart.add_item(matcha, &[], oat, half, 1)?;
  info!(items = cart.total_items(), total = %cart.total_price(), "Cart ready.");

  // 4. Checkout.
  let customer = CustomerInfo {
    name: Some("Mina".to_string()),
    email: None,
  };
  let submitted = cart.submit(&orders, Some(customer)).await?;
  info!(order_id = %submitted.order.id, "Order placed.");

  // 5. Confirmation QR, with the payload a scanner would read back.
  let confirmation = qr::confirm_order(&submitted.order, &submitted.items, ImageFormat::Png)?;
  let payload = qr::encode_order_payload_text(&confirmation.data)?;
  info!(variant = ?confirmation.variant, verified = qr::verify_order_payload(&payload), "QR payload: {}", payload);

  let file_name = confirmation.image.download_file_name(&submitted.order.id);
  std::fs::write(&file_name, &confirmation.image.bytes)?;
  info!("Wrote {} ({} px).", file_name, confirmation.image.width);

  Ok(())
}
