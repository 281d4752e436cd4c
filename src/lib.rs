//! ledgerd Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod domain;
pub mod password;
pub mod store;

pub mod config;
pub mod db;
mod error;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use domain::{Currency, OperationContext};
pub use store::{Store, StoreError, TransferParams, TransferResult};
