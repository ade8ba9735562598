//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use time::Date;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The category used to create a transaction does not exist and its name
    /// does not qualify for automatic creation.
    #[error("Category not found")]
    CategoryNotFound(String),

    /// A category with the same name and type already exists for the user.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategory(String),

    /// A category name was empty or too long.
    #[error("category names must be between 1 and {max} characters, got \"{name}\"")]
    InvalidCategoryName {
        /// The rejected name.
        name: String,
        /// The maximum number of characters allowed.
        max: usize,
    },

    /// A string could not be parsed as either "income" or "expense".
    #[error("\"{0}\" is not a valid transaction type, expected \"income\" or \"expense\"")]
    InvalidTransactionType(String),

    /// A monetary amount was not a finite number, or was not in the allowed range.
    #[error("{0} is not a valid amount")]
    InvalidAmount(f64),

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The start of a date range is after its end, or the range is too long.
    #[error("invalid date range {from} to {to}: {reason}")]
    InvalidDateRange {
        /// The start of the rejected range.
        from: Date,
        /// The end of the rejected range.
        to: Date,
        /// Why the range was rejected.
        reason: &'static str,
    },

    /// A month number outside of 1..=12 was requested.
    #[error("{0} is not a valid month, expected a number from 1 to 12")]
    InvalidMonth(u8),

    /// A required text field was empty.
    #[error("the field \"{0}\" cannot be empty")]
    EmptyField(&'static str),

    /// The request body, query string or path could not be parsed.
    #[error("{0}")]
    InvalidRequest(String),

    /// The request body was longer than the server accepts.
    #[error("the request body cannot be longer than {0} bytes")]
    RequestBodyTooLarge(usize),

    /// The currency code is not one of the supported currencies.
    #[error("\"{0}\" is not a supported currency")]
    InvalidCurrency(String),

    /// An invoice's due date is before its issue date.
    #[error("the due date {due_on} is before the issue date {issued_on}")]
    DueBeforeIssue {
        /// When the invoice was issued.
        issued_on: Date,
        /// When the invoice is due.
        due_on: Date,
    },

    /// Another customer of the same user already uses this email address.
    #[error("a customer with the email \"{0}\" already exists")]
    DuplicateCustomerEmail(String),

    /// Another inventory item of the same user already uses this SKU.
    #[error("an inventory item with the SKU \"{0}\" already exists")]
    DuplicateSku(String),

    /// Another invoice of the same user already uses this invoice number.
    #[error("an invoice with the number \"{0}\" already exists")]
    DuplicateInvoiceNumber(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to delete a customer that does not exist
    #[error("tried to delete a customer that is not in the database")]
    DeleteMissingCustomer,

    /// Tried to delete an inventory item that does not exist
    #[error("tried to delete an inventory item that is not in the database")]
    DeleteMissingInventoryItem,

    /// Tried to delete a staff member that does not exist
    #[error("tried to delete a staff member that is not in the database")]
    DeleteMissingStaff,

    /// Tried to update an invoice that does not exist
    #[error("tried to update an invoice that is not in the database")]
    UpdateMissingInvoice,

    /// Tried to delete an invoice that does not exist
    #[error("tried to delete an invoice that is not in the database")]
    DeleteMissingInvoice,

    /// Tried to delete a ledger entry that does not exist
    #[error("tried to delete a ledger entry that is not in the database")]
    DeleteMissingLedgerEntry,

    /// Tried to delete a daybook entry that does not exist
    #[error("tried to delete a daybook entry that is not in the database")]
    DeleteMissingDaybookEntry,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// Returns true if `error` is a violation of a UNIQUE constraint.
pub(crate) fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY,
            },
            _,
        )
    )
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::CategoryNotFound(_) | Error::NotFound => StatusCode::NOT_FOUND,
            Error::DeleteMissingTransaction
            | Error::DeleteMissingCategory
            | Error::DeleteMissingCustomer
            | Error::DeleteMissingInventoryItem
            | Error::DeleteMissingStaff
            | Error::UpdateMissingInvoice
            | Error::DeleteMissingInvoice
            | Error::DeleteMissingLedgerEntry
            | Error::DeleteMissingDaybookEntry => StatusCode::NOT_FOUND,
            Error::DuplicateCategory(_)
            | Error::DuplicateCustomerEmail(_)
            | Error::DuplicateSku(_)
            | Error::DuplicateInvoiceNumber(_) => StatusCode::CONFLICT,
            Error::InvalidCategoryName { .. }
            | Error::InvalidTransactionType(_)
            | Error::InvalidAmount(_)
            | Error::FutureDate(_)
            | Error::InvalidDateRange { .. }
            | Error::InvalidMonth(_)
            | Error::EmptyField(_)
            | Error::InvalidCurrency(_)
            | Error::InvalidRequest(_)
            | Error::DueBeforeIssue { .. } => StatusCode::BAD_REQUEST,
            Error::RequestBodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::InvalidTimezoneError(_) | Error::DatabaseLockError | Error::SqlError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            Error::InvalidTimezoneError(timezone) => format!(
                "Could not get local timezone \"{timezone}\". Check your server settings and \
                ensure the timezone has been set to valid, canonical timezone string"
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
