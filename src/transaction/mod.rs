//! Transactions, transfers, and the routes for managing them.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod form;
mod new_page;
mod transactions_page;
mod transfer;

pub use core::{
    Recurrence, ResponsibleParty, Transaction, TransactionData, TransactionId, TransactionKind,
    TransactionStatus, create_transaction, create_transaction_table, delete_transaction,
    get_all_transactions, get_transaction, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use new_page::get_new_transaction_page;
pub use transactions_page::get_transactions_page;
pub use transfer::{TransferData, record_transfer};
