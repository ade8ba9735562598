//! Income and expense transactions, and the history totals they feed.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the atomic create and delete operations
//! - Queries for listing transactions in a date range
//! - The route handlers for the transactions API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod list_endpoint;

pub use core::{
    NewTransaction, Transaction, create_transaction, create_transaction_table,
    delete_transaction, get_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use list_endpoint::get_transactions_endpoint;

#[cfg(test)]
pub use core::count_transactions;
