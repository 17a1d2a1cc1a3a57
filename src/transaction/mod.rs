//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the data for recording a new one
//! - Database functions for storing, querying and deleting transactions,
//!   keeping the derived aggregates in step
//! - Route handlers for creating, deleting and listing transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod history;

pub use core::{
    MAX_AMOUNT, NewTransaction, Transaction, create_transaction, create_transaction_table,
    delete_transaction, get_transactions_in_range,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use history::get_transaction_history;

#[cfg(test)]
pub use core::get_transaction;
