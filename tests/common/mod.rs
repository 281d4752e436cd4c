//! Common test utilities

use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::postgres::PgPoolOptions;

use ledgerd::store::CreateAccountParams;
use ledgerd::{Currency, Store};

/// Connect to the test database and run migrations.
///
/// Returns `None` when DATABASE_URL is not set so the integration suite can
/// be skipped in environments without Postgres.
pub async fn try_setup() -> Option<Store> {
    dotenvy::dotenv().ok();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => return None,
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(Store::new(pool))
}

/// Random integer in [min, max]
pub fn random_int(min: i64, max: i64) -> i64 {
    rand::thread_rng().gen_range(min..=max)
}

/// Random alphanumeric string of length n
pub fn random_string(n: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(n)
        .map(char::from)
        .collect()
}

/// Random account owner name
pub fn random_owner() -> String {
    random_string(6)
}

/// Random balance between 0 and 1000
pub fn random_money() -> i64 {
    random_int(0, 1000)
}

/// Random supported currency
pub fn random_currency() -> Currency {
    let all = Currency::ALL;
    all[rand::thread_rng().gen_range(0..all.len())]
}

/// Random email address
pub fn random_email() -> String {
    format!("{}@example.com", random_string(6))
}

/// Insert an account with a random owner, balance and currency
pub async fn create_random_account(store: &Store) -> ledgerd::store::Account {
    store
        .create_account(CreateAccountParams {
            owner: random_owner(),
            balance: random_money(),
            currency: random_currency().as_str().to_string(),
        })
        .await
        .expect("Failed to create account")
}

/// Insert an account with a random owner and a fixed balance and currency
pub async fn create_account_with_balance(
    store: &Store,
    balance: i64,
    currency: Currency,
) -> ledgerd::store::Account {
    store
        .create_account(CreateAccountParams {
            owner: random_owner(),
            balance,
            currency: currency.as_str().to_string(),
        })
        .await
        .expect("Failed to create account")
}
