//! Recording transfers between accounts.
//!
//! A transfer is two transaction rows linked both ways: a sent leg on the
//! source account and a received leg on the destination account. Both legs
//! are inserted and linked inside a single SQLite transaction so a failure
//! part-way leaves nothing behind.

use rusqlite::{Connection, params};
use time::Date;

use crate::{
    Error,
    account::{AccountId, get_account},
    database_id::DatabaseId,
    period::PeriodId,
    transaction::core::{
        Recurrence, Transaction, TransactionData, TransactionKind, TransactionStatus,
        create_transaction,
    },
};

/// The fields for recording a transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferData<'a> {
    pub amount: f64,
    pub date: Date,
    pub source_account_id: AccountId,
    pub counterpart_account_id: AccountId,
    pub description: &'a str,
    pub period_id: Option<PeriodId>,
}

/// Record a transfer as two linked, completed transaction rows.
///
/// The sent leg is inserted first, so the sent leg of a pair is always the
/// one with the lower ID. Returns `(sent, received)`.
///
/// # Errors
/// Returns [Error::SameTransferAccounts] if both accounts are the same,
/// [Error::NonPositiveAmount] for a zero or negative amount, or
/// [Error::InvalidReference]/[Error::NotFound] if either account does not
/// exist for this user.
pub fn record_transfer(
    data: &TransferData,
    user_id: DatabaseId,
    connection: &Connection,
) -> Result<(Transaction, Transaction), Error> {
    if data.source_account_id == data.counterpart_account_id {
        return Err(Error::SameTransferAccounts);
    }

    let sql_transaction = connection.unchecked_transaction()?;

    let source = get_account(data.source_account_id, user_id, &sql_transaction)?;
    let destination = get_account(data.counterpart_account_id, user_id, &sql_transaction)?;

    let description = data.description.trim();
    let description = if description.is_empty() {
        "Transfer"
    } else {
        description
    };

    let mut sent = create_transaction(
        &TransactionData {
            amount: data.amount,
            date: data.date,
            kind: TransactionKind::Transfer,
            status: TransactionStatus::Completed,
            recurrence: Recurrence::OneOff,
            description: &format!("Sent to {}: {description}", destination.name),
            category_id: None,
            account_id: source.id,
            counterpart_account_id: Some(destination.id),
            responsible: None,
            period_id: data.period_id,
        },
        user_id,
        &sql_transaction,
    )?;

    let mut received = create_transaction(
        &TransactionData {
            amount: data.amount,
            date: data.date,
            kind: TransactionKind::Transfer,
            status: TransactionStatus::Completed,
            recurrence: Recurrence::OneOff,
            description: &format!("Received from {}: {description}", source.name),
            category_id: None,
            account_id: destination.id,
            counterpart_account_id: Some(source.id),
            responsible: None,
            period_id: data.period_id,
        },
        user_id,
        &sql_transaction,
    )?;

    sql_transaction.execute(
        "UPDATE \"transaction\" SET linked_transaction_id = ?1 WHERE id = ?2",
        params![received.id, sent.id],
    )?;
    sql_transaction.execute(
        "UPDATE \"transaction\" SET linked_transaction_id = ?1 WHERE id = ?2",
        params![sent.id, received.id],
    )?;

    sql_transaction.commit()?;

    sent.linked_transaction_id = Some(received.id);
    received.linked_transaction_id = Some(sent.id);

    Ok((sent, received))
}
