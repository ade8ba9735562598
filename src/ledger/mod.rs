//! Bookkeeping ledgers, e.g. "Bank" or "Salary", made of credit and debit
//! entries.

mod core;
mod endpoints;

pub use core::{
    EntryKind, LedgerEntry, LedgerEntryForm, LedgerEntryView, LedgerSummary,
    create_ledger_entry, create_ledger_table, delete_ledger_entry, get_ledger_entries,
    get_ledger_summaries, with_running_balances,
};
pub use endpoints::{
    create_ledger_entry_endpoint, delete_ledger_entry_endpoint, get_ledger_entries_endpoint,
    get_ledger_summary_endpoint,
};
