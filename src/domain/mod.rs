//! Domain module
//!
//! Core domain types shared across the store and API layers.

pub mod context;
pub mod currency;

pub use context::OperationContext;
pub use currency::{Currency, CurrencyError};
