//! Transfer engine
//!
//! Moves funds between two accounts inside one atomic unit of work: one
//! transfer row, two offsetting entries, two balance deltas. All-or-nothing,
//! and safe under arbitrary concurrent invocations on overlapping accounts.

use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

use crate::domain::OperationContext;

use super::error::StoreError;
use super::models::{Account, Entry, Transfer};
use super::queries::{self, AddAccountBalanceParams, CreateEntryParams, CreateTransferParams};
use super::Store;

/// Input for one transfer invocation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransferParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    /// Positive magnitude moved, in the smallest currency unit
    pub amount: i64,
}

/// Everything written by one committed transfer, plus both post-update
/// account snapshots. Never persisted; owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub transfer: Transfer,
    pub from_account: Account,
    pub to_account: Account,
    pub from_entry: Entry,
    pub to_entry: Entry,
}

/// The two balance deltas of a transfer, ordered by ascending account id.
///
/// Concurrent transfers on overlapping accounts acquire their row locks in
/// this one global order, so a circular wait cannot form. For a self-transfer
/// both elements name the same account and the deltas net to zero.
fn ordered_deltas(arg: TransferParams) -> [AddAccountBalanceParams; 2] {
    let from = AddAccountBalanceParams {
        id: arg.from_account_id,
        amount: -arg.amount,
    };
    let to = AddAccountBalanceParams {
        id: arg.to_account_id,
        amount: arg.amount,
    };

    if arg.from_account_id < arg.to_account_id {
        [from, to]
    } else {
        [to, from]
    }
}

/// Apply both balance updates in the order given, returning the updated rows
/// in the same order.
async fn add_money(
    conn: &mut PgConnection,
    first: AddAccountBalanceParams,
    second: AddAccountBalanceParams,
) -> Result<(Account, Account), StoreError> {
    let account1 = queries::add_account_balance(&mut *conn, first).await?;
    let account2 = queries::add_account_balance(&mut *conn, second).await?;

    Ok((account1, account2))
}

impl Store {
    /// Execute a funds transfer as one atomic unit of work.
    ///
    /// Creates the transfer record, one `-amount` entry on the source, one
    /// `+amount` entry on the destination, and applies both balance deltas in
    /// ascending-account-id order. Any failure rolls the whole unit of work
    /// back; the caller sees either a complete [`TransferResult`] or an error
    /// with no partial state committed.
    ///
    /// No retries happen here: a [`StoreError::Conflict`] is surfaced so the
    /// caller can decide whether a retry is safe.
    pub async fn transfer_tx(
        &self,
        arg: TransferParams,
        ctx: &OperationContext,
    ) -> Result<TransferResult, StoreError> {
        let correlation_id = ctx.correlation_id;

        self.with_tx(move |conn| {
            Box::pin(async move {
                tracing::debug!(
                    ?correlation_id,
                    from_account_id = arg.from_account_id,
                    to_account_id = arg.to_account_id,
                    amount = arg.amount,
                    "creating transfer record"
                );
                // Fails fast on a missing account: the FK violation aborts the
                // unit of work before any entry or balance write.
                let transfer = queries::create_transfer(
                    &mut *conn,
                    CreateTransferParams {
                        from_account_id: arg.from_account_id,
                        to_account_id: arg.to_account_id,
                        amount: arg.amount,
                    },
                )
                .await?;

                tracing::debug!(?correlation_id, "creating source entry");
                let from_entry = queries::create_entry(
                    &mut *conn,
                    CreateEntryParams {
                        account_id: arg.from_account_id,
                        amount: -arg.amount,
                    },
                )
                .await?;

                tracing::debug!(?correlation_id, "creating destination entry");
                let to_entry = queries::create_entry(
                    &mut *conn,
                    CreateEntryParams {
                        account_id: arg.to_account_id,
                        amount: arg.amount,
                    },
                )
                .await?;

                tracing::debug!(?correlation_id, "updating account balances");
                let [first, second] = ordered_deltas(arg);
                let (account1, account2) = add_money(conn, first, second).await?;

                // Snapshots are assigned by role, not by update order. A
                // self-transfer has only one account: both roles get the row
                // as of the second update, after the deltas netted to zero.
                let (from_account, to_account) = if arg.from_account_id == arg.to_account_id {
                    (account2.clone(), account2)
                } else if first.id == arg.from_account_id {
                    (account1, account2)
                } else {
                    (account2, account1)
                };

                Ok(TransferResult {
                    transfer,
                    from_account,
                    to_account,
                    from_entry,
                    to_entry,
                })
            })
        })
        .await
    }
}
