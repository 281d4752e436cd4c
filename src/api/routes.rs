//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Currency, OperationContext};
use crate::error::AppError;
use crate::password;
use crate::store::{
    Account, CreateAccountParams, CreateUserParams, Entry, ListAccountsParams, ListEntriesParams,
    Store, StoreError, Transfer, TransferParams, TransferResult,
};

/// Pagination bounds for list endpoints
const MIN_PAGE_SIZE: i64 = 5;
const MAX_PAGE_SIZE: i64 = 10;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub owner: String,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page_id: i64,
    pub page_size: i64,
}

impl PageQuery {
    /// Validate the pagination window and convert it to limit/offset
    fn limit_offset(&self) -> Result<(i64, i64), AppError> {
        if self.page_id < 1 {
            return Err(AppError::InvalidRequest(
                "page_id must be at least 1".to_string(),
            ));
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(AppError::InvalidRequest(format!(
                "page_size must be between {} and {}",
                MIN_PAGE_SIZE, MAX_PAGE_SIZE
            )));
        }
        Ok((self.page_size, (self.page_id - 1) * self.page_size))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTransferRequest {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
}

/// User representation without the password hash
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<Store> {
    Router::new()
        .route("/accounts", post(create_account))
        .route("/accounts", get(list_accounts))
        .route("/accounts/:id", get(get_account))
        .route("/accounts/:id/entries", get(list_account_entries))
        .route("/transfers", post(create_transfer))
        .route("/transfers/:id", get(get_transfer))
        .route("/users", post(create_user))
}

// =========================================================================
// POST /accounts
// =========================================================================

/// Create a new account with a zero starting balance
async fn create_account(
    State(store): State<Store>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    if request.owner.trim().is_empty() {
        return Err(AppError::InvalidRequest("owner is required".to_string()));
    }
    let currency: Currency = request
        .currency
        .parse()
        .map_err(|_| AppError::UnsupportedCurrency(request.currency.clone()))?;

    let account = store
        .create_account(CreateAccountParams {
            owner: request.owner,
            balance: 0,
            currency: currency.as_str().to_string(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

// =========================================================================
// GET /accounts/:id
// =========================================================================

/// Get account by ID
async fn get_account(
    State(store): State<Store>,
    Path(id): Path<i64>,
) -> Result<Json<Account>, AppError> {
    let account = store.get_account(id).await.map_err(|err| match err {
        StoreError::NotFound => AppError::AccountNotFound(id),
        other => AppError::Store(other),
    })?;

    Ok(Json(account))
}

// =========================================================================
// GET /accounts
// =========================================================================

/// List accounts, paginated
async fn list_accounts(
    State(store): State<Store>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<Account>>, AppError> {
    let (limit, offset) = page.limit_offset()?;

    let accounts = store.list_accounts(ListAccountsParams { limit, offset }).await?;

    Ok(Json(accounts))
}

// =========================================================================
// GET /accounts/:id/entries
// =========================================================================

/// List the ledger entries recorded against one account, paginated
async fn list_account_entries(
    State(store): State<Store>,
    Path(id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<Entry>>, AppError> {
    let (limit, offset) = page.limit_offset()?;

    // Distinguish a missing account from an account with no entries
    store.get_account(id).await.map_err(|err| match err {
        StoreError::NotFound => AppError::AccountNotFound(id),
        other => AppError::Store(other),
    })?;

    let entries = store
        .list_entries(ListEntriesParams {
            account_id: id,
            limit,
            offset,
        })
        .await?;

    Ok(Json(entries))
}

// =========================================================================
// POST /transfers
// =========================================================================

/// Move funds between two accounts
async fn create_transfer(
    State(store): State<Store>,
    Extension(context): Extension<OperationContext>,
    Json(request): Json<CreateTransferRequest>,
) -> Result<(StatusCode, Json<TransferResult>), AppError> {
    if request.amount <= 0 {
        return Err(AppError::InvalidRequest(
            "amount must be positive".to_string(),
        ));
    }
    let currency: Currency = request
        .currency
        .parse()
        .map_err(|_| AppError::UnsupportedCurrency(request.currency.clone()))?;

    // Both accounts must exist and be denominated in the requested currency
    valid_account(&store, request.from_account_id, currency).await?;
    valid_account(&store, request.to_account_id, currency).await?;

    let result = store
        .transfer_tx(
            TransferParams {
                from_account_id: request.from_account_id,
                to_account_id: request.to_account_id,
                amount: request.amount,
            },
            &context,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// Check that an account exists and carries the requested currency
async fn valid_account(
    store: &Store,
    account_id: i64,
    currency: Currency,
) -> Result<Account, AppError> {
    let account = store.get_account(account_id).await.map_err(|err| match err {
        StoreError::NotFound => AppError::AccountNotFound(account_id),
        other => AppError::Store(other),
    })?;

    if account.currency != currency.as_str() {
        return Err(AppError::CurrencyMismatch {
            account_id,
            account_currency: account.currency.clone(),
            requested: currency.as_str().to_string(),
        });
    }

    Ok(account)
}

// =========================================================================
// GET /transfers/:id
// =========================================================================

/// Get transfer by ID
async fn get_transfer(
    State(store): State<Store>,
    Path(id): Path<i64>,
) -> Result<Json<Transfer>, AppError> {
    let transfer = store.get_transfer(id).await?;

    Ok(Json(transfer))
}

// =========================================================================
// POST /users
// =========================================================================

/// Register a new user
async fn create_user(
    State(store): State<Store>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    if request.username.is_empty() || !request.username.chars().all(char::is_alphanumeric) {
        return Err(AppError::InvalidRequest(
            "username must be non-empty and alphanumeric".to_string(),
        ));
    }
    if request.password.len() < 6 {
        return Err(AppError::InvalidRequest(
            "password must be at least 6 characters".to_string(),
        ));
    }
    if !request.email.contains('@') {
        return Err(AppError::InvalidRequest(
            "email must be a valid address".to_string(),
        ));
    }

    let hashed_password = password::hash_password(&request.password)?;

    let user = store
        .create_user(CreateUserParams {
            username: request.username,
            hashed_password,
            full_name: request.full_name,
            email: request.email,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            password_changed_at: user.password_changed_at,
            created_at: user.created_at,
        }),
    ))
}
