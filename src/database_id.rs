//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
pub type TransactionId = DatabaseId;
pub type CustomerId = DatabaseId;
pub type InventoryItemId = DatabaseId;
pub type StaffId = DatabaseId;
pub type InvoiceId = DatabaseId;
pub type LedgerEntryId = DatabaseId;
pub type DaybookEntryId = DatabaseId;
