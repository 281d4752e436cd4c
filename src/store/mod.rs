//! Ledger store
//!
//! Persistence layer for accounts, entries, transfers and users. Single-row
//! operations live in [`queries`] and run against whichever executor the call
//! site picks; [`Store`] runs them against its pool, and the transfer engine
//! composes them inside one atomic unit of work via [`Store::with_tx`].

use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool};

pub mod error;
pub mod models;
pub mod queries;
pub mod transfer;

pub use error::StoreError;
pub use models::{Account, Entry, Transfer, User};
pub use queries::{
    AddAccountBalanceParams, CreateAccountParams, CreateEntryParams, CreateTransferParams,
    CreateUserParams, ListAccountsParams, ListEntriesParams, ListTransfersParams,
    UpdateAccountParams,
};
pub use transfer::{TransferParams, TransferResult};

/// Handle to the ledger database
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    /// Create a new store backed by a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for schema checks and tests
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run a sequence of store operations as one atomic unit of work.
    ///
    /// Begins a transaction, hands the transaction-scoped connection to `op`,
    /// and commits on success. On failure the transaction is rolled back and
    /// the operation's error is returned; if the rollback itself fails both
    /// errors are reported together as [`StoreError::RollbackFailed`].
    ///
    /// Exactly one begin and one commit-or-rollback per call, never nested.
    /// Dropping the returned future mid-flight aborts the transaction on the
    /// connection, leaving no observable effect.
    pub async fn with_tx<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, StoreError>>,
    {
        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;

        match op(&mut tx).await {
            Ok(value) => {
                tx.commit().await.map_err(StoreError::from)?;
                Ok(value)
            }
            Err(err) => match tx.rollback().await {
                Ok(()) => Err(err),
                Err(rollback) => Err(StoreError::RollbackFailed {
                    source: Box::new(err),
                    rollback,
                }),
            },
        }
    }

    // =====================================================================
    // Single-row operations, run as independent statements on the pool
    // =====================================================================

    pub async fn create_account(&self, arg: CreateAccountParams) -> Result<Account, StoreError> {
        queries::create_account(&self.pool, arg).await
    }

    pub async fn get_account(&self, id: i64) -> Result<Account, StoreError> {
        queries::get_account(&self.pool, id).await
    }

    pub async fn list_accounts(&self, arg: ListAccountsParams) -> Result<Vec<Account>, StoreError> {
        queries::list_accounts(&self.pool, arg).await
    }

    pub async fn update_account(&self, arg: UpdateAccountParams) -> Result<Account, StoreError> {
        queries::update_account(&self.pool, arg).await
    }

    pub async fn delete_account(&self, id: i64) -> Result<(), StoreError> {
        queries::delete_account(&self.pool, id).await
    }

    pub async fn create_entry(&self, arg: CreateEntryParams) -> Result<Entry, StoreError> {
        queries::create_entry(&self.pool, arg).await
    }

    pub async fn get_entry(&self, id: i64) -> Result<Entry, StoreError> {
        queries::get_entry(&self.pool, id).await
    }

    pub async fn list_entries(&self, arg: ListEntriesParams) -> Result<Vec<Entry>, StoreError> {
        queries::list_entries(&self.pool, arg).await
    }

    pub async fn create_transfer(&self, arg: CreateTransferParams) -> Result<Transfer, StoreError> {
        queries::create_transfer(&self.pool, arg).await
    }

    pub async fn get_transfer(&self, id: i64) -> Result<Transfer, StoreError> {
        queries::get_transfer(&self.pool, id).await
    }

    pub async fn list_transfers(
        &self,
        arg: ListTransfersParams,
    ) -> Result<Vec<Transfer>, StoreError> {
        queries::list_transfers(&self.pool, arg).await
    }

    pub async fn create_user(&self, arg: CreateUserParams) -> Result<User, StoreError> {
        queries::create_user(&self.pool, arg).await
    }

    pub async fn get_user(&self, username: &str) -> Result<User, StoreError> {
        queries::get_user(&self.pool, username).await
    }
}
