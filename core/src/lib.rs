// src/lib.rs

//! Bobabble: the ordering core of a bubble-tea storefront.
//!
//! - `pricing`: unit price of a configured drink.
//! - `cart`: ordered, self-merging cart lines and the guarded checkout flow.
//! - `catalog`: menu reads with an explicit fallback to the built-in demo menu.
//! - `orders`: order persistence with compensating cleanup on partial writes.
//! - `qr`: the self-verifying order confirmation payload, generic payload
//!   templates and deterministic raster rendering.
//! - `store`: the remote record store (`RestStore`) and its in-process twin
//!   (`MemoryStore`), selected once at startup through `Backend`.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod orders;
pub mod pricing;
pub mod qr;
pub mod session;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::cart::{Cart, CartItem, CartStore, CustomerInfo, SubmittedOrder};
pub use crate::catalog::{CatalogGateway, FallbackPolicy, Fetched};
pub use crate::config::StoreConfig;
pub use crate::error::{CartError, CatalogError, OrderError, QrError, StoreError, SubmitError};
pub use crate::models::{
  CategoryFilter, Drink, DrinkCategory, MilkOption, Order, OrderItem, OrderStatus, PaymentStatus, SweetnessLevel,
  Topping,
};
pub use crate::orders::{CreateOrderRequest, OrderGateway};
pub use crate::qr::{OrderQrData, QrContent, RasterImage, RenderOptions};
pub use crate::session::{Menu, RequestSequencer};
pub use crate::store::{Backend, MemoryStore, RecordStore, RestStore};
