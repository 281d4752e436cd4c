//! Single-row ledger operations
//!
//! Each function is exactly one SQL statement, generic over the executor so
//! the same code runs against the pool as an independent statement or against
//! a transaction handle inside a unit of work. The executor is picked
//! explicitly at every call site.

use sqlx::PgExecutor;

use super::error::StoreError;
use super::models::{Account, Entry, Transfer, User};

// =========================================================================
// Accounts
// =========================================================================

#[derive(Debug, Clone)]
pub struct CreateAccountParams {
    pub owner: String,
    pub balance: i64,
    pub currency: String,
}

pub async fn create_account(
    ex: impl PgExecutor<'_>,
    arg: CreateAccountParams,
) -> Result<Account, StoreError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (owner, balance, currency)
        VALUES ($1, $2, $3)
        RETURNING id, owner, balance, currency, created_at
        "#,
    )
    .bind(&arg.owner)
    .bind(arg.balance)
    .bind(&arg.currency)
    .fetch_one(ex)
    .await?;

    Ok(account)
}

pub async fn get_account(ex: impl PgExecutor<'_>, id: i64) -> Result<Account, StoreError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, owner, balance, currency, created_at
        FROM accounts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_one(ex)
    .await?;

    Ok(account)
}

#[derive(Debug, Clone, Copy)]
pub struct ListAccountsParams {
    pub limit: i64,
    pub offset: i64,
}

pub async fn list_accounts(
    ex: impl PgExecutor<'_>,
    arg: ListAccountsParams,
) -> Result<Vec<Account>, StoreError> {
    let accounts = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, owner, balance, currency, created_at
        FROM accounts
        ORDER BY id
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(arg.limit)
    .bind(arg.offset)
    .fetch_all(ex)
    .await?;

    Ok(accounts)
}

#[derive(Debug, Clone, Copy)]
pub struct UpdateAccountParams {
    pub id: i64,
    pub balance: i64,
}

/// Overwrite an account balance. CRUD maintenance only; the transfer engine
/// never sets an absolute balance.
pub async fn update_account(
    ex: impl PgExecutor<'_>,
    arg: UpdateAccountParams,
) -> Result<Account, StoreError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET balance = $2
        WHERE id = $1
        RETURNING id, owner, balance, currency, created_at
        "#,
    )
    .bind(arg.id)
    .bind(arg.balance)
    .fetch_one(ex)
    .await?;

    Ok(account)
}

#[derive(Debug, Clone, Copy)]
pub struct AddAccountBalanceParams {
    pub id: i64,
    pub amount: i64,
}

/// Apply a signed delta to an account balance and return the updated row.
/// The addition happens in the statement itself, under the row lock, so no
/// read-modify-write ever runs in the application.
pub async fn add_account_balance(
    ex: impl PgExecutor<'_>,
    arg: AddAccountBalanceParams,
) -> Result<Account, StoreError> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET balance = balance + $2
        WHERE id = $1
        RETURNING id, owner, balance, currency, created_at
        "#,
    )
    .bind(arg.id)
    .bind(arg.amount)
    .fetch_one(ex)
    .await?;

    Ok(account)
}

pub async fn delete_account(ex: impl PgExecutor<'_>, id: i64) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM accounts WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;

    Ok(())
}

// =========================================================================
// Entries
// =========================================================================

#[derive(Debug, Clone, Copy)]
pub struct CreateEntryParams {
    pub account_id: i64,
    pub amount: i64,
}

pub async fn create_entry(
    ex: impl PgExecutor<'_>,
    arg: CreateEntryParams,
) -> Result<Entry, StoreError> {
    let entry = sqlx::query_as::<_, Entry>(
        r#"
        INSERT INTO entries (account_id, amount)
        VALUES ($1, $2)
        RETURNING id, account_id, amount, created_at
        "#,
    )
    .bind(arg.account_id)
    .bind(arg.amount)
    .fetch_one(ex)
    .await?;

    Ok(entry)
}

pub async fn get_entry(ex: impl PgExecutor<'_>, id: i64) -> Result<Entry, StoreError> {
    let entry = sqlx::query_as::<_, Entry>(
        r#"
        SELECT id, account_id, amount, created_at
        FROM entries
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_one(ex)
    .await?;

    Ok(entry)
}

#[derive(Debug, Clone, Copy)]
pub struct ListEntriesParams {
    pub account_id: i64,
    pub limit: i64,
    pub offset: i64,
}

pub async fn list_entries(
    ex: impl PgExecutor<'_>,
    arg: ListEntriesParams,
) -> Result<Vec<Entry>, StoreError> {
    let entries = sqlx::query_as::<_, Entry>(
        r#"
        SELECT id, account_id, amount, created_at
        FROM entries
        WHERE account_id = $1
        ORDER BY id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(arg.account_id)
    .bind(arg.limit)
    .bind(arg.offset)
    .fetch_all(ex)
    .await?;

    Ok(entries)
}

// =========================================================================
// Transfers
// =========================================================================

#[derive(Debug, Clone, Copy)]
pub struct CreateTransferParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
}

pub async fn create_transfer(
    ex: impl PgExecutor<'_>,
    arg: CreateTransferParams,
) -> Result<Transfer, StoreError> {
    let transfer = sqlx::query_as::<_, Transfer>(
        r#"
        INSERT INTO transfers (from_account_id, to_account_id, amount)
        VALUES ($1, $2, $3)
        RETURNING id, from_account_id, to_account_id, amount, created_at
        "#,
    )
    .bind(arg.from_account_id)
    .bind(arg.to_account_id)
    .bind(arg.amount)
    .fetch_one(ex)
    .await?;

    Ok(transfer)
}

pub async fn get_transfer(ex: impl PgExecutor<'_>, id: i64) -> Result<Transfer, StoreError> {
    let transfer = sqlx::query_as::<_, Transfer>(
        r#"
        SELECT id, from_account_id, to_account_id, amount, created_at
        FROM transfers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_one(ex)
    .await?;

    Ok(transfer)
}

#[derive(Debug, Clone, Copy)]
pub struct ListTransfersParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub limit: i64,
    pub offset: i64,
}

pub async fn list_transfers(
    ex: impl PgExecutor<'_>,
    arg: ListTransfersParams,
) -> Result<Vec<Transfer>, StoreError> {
    let transfers = sqlx::query_as::<_, Transfer>(
        r#"
        SELECT id, from_account_id, to_account_id, amount, created_at
        FROM transfers
        WHERE from_account_id = $1 OR to_account_id = $2
        ORDER BY id
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(arg.from_account_id)
    .bind(arg.to_account_id)
    .bind(arg.limit)
    .bind(arg.offset)
    .fetch_all(ex)
    .await?;

    Ok(transfers)
}

// =========================================================================
// Users
// =========================================================================

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub hashed_password: String,
    pub full_name: String,
    pub email: String,
}

pub async fn create_user(
    ex: impl PgExecutor<'_>,
    arg: CreateUserParams,
) -> Result<User, StoreError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, hashed_password, full_name, email)
        VALUES ($1, $2, $3, $4)
        RETURNING username, hashed_password, full_name, email, password_changed_at, created_at
        "#,
    )
    .bind(&arg.username)
    .bind(&arg.hashed_password)
    .bind(&arg.full_name)
    .bind(&arg.email)
    .fetch_one(ex)
    .await?;

    Ok(user)
}

pub async fn get_user(ex: impl PgExecutor<'_>, username: &str) -> Result<User, StoreError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT username, hashed_password, full_name, email, password_changed_at, created_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_one(ex)
    .await?;

    Ok(user)
}
