//! Deposits into and withdrawals from savings goals.
//!
//! A goal's balance only changes through [record_transaction], which stores the
//! transaction and the new balance in a single unit of work.

mod balance;
mod core;
mod endpoints;
mod ledger;

pub use balance::{TransactionRequest, apply, ledger_balance};
pub use core::{
    NewTransaction, Transaction, TransactionKind, append_transaction, create_transaction_table,
    list_transactions_by_goal, list_transactions_by_user, map_transaction_row,
};
pub use endpoints::{
    TransactionData, TransactionState, create_transaction_endpoint, get_goal_audit_endpoint,
    list_goal_transactions_endpoint, list_transactions_endpoint,
};
pub use ledger::{BalanceAudit, audit_goal_balance, create_transaction, record_transaction};
