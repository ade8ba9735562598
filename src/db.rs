//! Sets up the application's SQLite database.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, category::create_category_table, customer::create_customer_table,
    daybook::create_daybook_table, history::create_history_tables,
    inventory::create_inventory_table, invoice::create_invoice_table,
    ledger::create_ledger_table, staff::create_staff_table,
    transaction::create_transaction_table, user_settings::create_user_settings_table,
};

/// Create the tables for the domain models if they do not exist yet.
///
/// All tables are created in a single exclusive transaction, so a failure
/// leaves the database untouched.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_settings_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_history_tables(&transaction)?;
    create_customer_table(&transaction)?;
    create_inventory_table(&transaction)?;
    create_staff_table(&transaction)?;
    create_invoice_table(&transaction)?;
    create_ledger_table(&transaction)?;
    create_daybook_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
