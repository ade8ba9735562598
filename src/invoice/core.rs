//! Defines the invoice models and database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, OptionalExtension, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserId, database_id::InvoiceId, error::is_unique_violation};

/// Whether the customer has paid, as recorded by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Unpaid => "unpaid",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(PaymentStatus::Paid),
            "unpaid" => Ok(PaymentStatus::Unpaid),
            other => Err(format!("invalid payment status \"{other}\"")),
        }
    }
}

impl ToSql for PaymentStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for PaymentStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// The status shown for an invoice, which accounts for the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    Unpaid,
    /// Unpaid after the due date.
    Overdue,
}

/// A bill sent to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// The user's own reference for the invoice, e.g. "INV-0042".
    pub invoice_number: String,
    pub customer_name: String,
    pub amount: f64,
    pub payment_status: PaymentStatus,
    pub issued_on: Date,
    pub due_on: Date,
}

impl Invoice {
    /// The status of the invoice as of `today`.
    pub fn status(&self, today: Date) -> InvoiceStatus {
        match self.payment_status {
            PaymentStatus::Paid => InvoiceStatus::Paid,
            PaymentStatus::Unpaid if self.due_on < today => InvoiceStatus::Overdue,
            PaymentStatus::Unpaid => InvoiceStatus::Unpaid,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceForm {
    pub invoice_number: String,
    pub customer_name: String,
    pub amount: f64,
    pub issued_on: Date,
    pub due_on: Date,
    #[serde(default = "unpaid")]
    pub payment_status: PaymentStatus,
}

fn unpaid() -> PaymentStatus {
    PaymentStatus::Unpaid
}

/// The number of invoices with a status and their combined amount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusTotals {
    pub count: usize,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub paid: StatusTotals,
    pub unpaid: StatusTotals,
    pub overdue: StatusTotals,
}

/// Save a new invoice for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyField] if the invoice number or customer name is blank,
/// - [Error::InvalidAmount] if the amount is not a positive, finite number,
/// - [Error::DueBeforeIssue] if the due date is before the issue date,
/// - [Error::DuplicateInvoiceNumber] if the user already has an invoice with the number,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_invoice(
    user_id: &UserId,
    form: InvoiceForm,
    connection: &Connection,
) -> Result<Invoice, Error> {
    let invoice_number = form.invoice_number.trim();
    if invoice_number.is_empty() {
        return Err(Error::EmptyField("invoice_number"));
    }

    let customer_name = form.customer_name.trim();
    if customer_name.is_empty() {
        return Err(Error::EmptyField("customer_name"));
    }

    if !form.amount.is_finite() || form.amount <= 0.0 {
        return Err(Error::InvalidAmount(form.amount));
    }

    if form.due_on < form.issued_on {
        return Err(Error::DueBeforeIssue {
            issued_on: form.issued_on,
            due_on: form.due_on,
        });
    }

    connection
        .prepare(
            "INSERT INTO invoice
                (user_id, invoice_number, customer_name, amount, status, issued_on, due_on)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, invoice_number, customer_name, amount, status, issued_on, due_on",
        )?
        .query_row(
            (
                user_id.as_str(),
                invoice_number,
                customer_name,
                form.amount,
                form.payment_status,
                form.issued_on,
                form.due_on,
            ),
            map_invoice_row,
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                Error::DuplicateInvoiceNumber(invoice_number.to_owned())
            } else {
                error.into()
            }
        })
}

/// Retrieve the invoices of `user_id`, most recently issued first.
pub fn get_invoices(user_id: &UserId, connection: &Connection) -> Result<Vec<Invoice>, Error> {
    connection
        .prepare(
            "SELECT id, invoice_number, customer_name, amount, status, issued_on, due_on
             FROM invoice WHERE user_id = ?1 ORDER BY issued_on DESC, id DESC",
        )?
        .query_map([user_id.as_str()], map_invoice_row)?
        .map(|maybe_invoice| maybe_invoice.map_err(Error::from))
        .collect()
}

/// Mark the invoice `id` of `user_id` as paid or unpaid.
///
/// # Errors
/// Returns [Error::UpdateMissingInvoice] if the user has no such invoice.
pub fn set_payment_status(
    user_id: &UserId,
    id: InvoiceId,
    payment_status: PaymentStatus,
    connection: &Connection,
) -> Result<Invoice, Error> {
    connection
        .prepare(
            "UPDATE invoice SET status = ?1 WHERE id = ?2 AND user_id = ?3
             RETURNING id, invoice_number, customer_name, amount, status, issued_on, due_on",
        )?
        .query_row((payment_status, id, user_id.as_str()), map_invoice_row)
        .optional()?
        .ok_or(Error::UpdateMissingInvoice)
}

/// Count and sum `invoices` by their status as of `today`.
pub fn summarize_invoices(invoices: &[Invoice], today: Date) -> InvoiceSummary {
    let mut summary = InvoiceSummary::default();

    for invoice in invoices {
        let totals = match invoice.status(today) {
            InvoiceStatus::Paid => &mut summary.paid,
            InvoiceStatus::Unpaid => &mut summary.unpaid,
            InvoiceStatus::Overdue => &mut summary.overdue,
        };

        totals.count += 1;
        totals.amount += invoice.amount;
    }

    summary
}

/// Delete the invoice `id` of `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingInvoice] if the user has no such invoice.
pub fn delete_invoice(
    user_id: &UserId,
    id: InvoiceId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM invoice WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingInvoice);
    }

    Ok(())
}

pub fn create_invoice_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS invoice (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            invoice_number TEXT NOT NULL,
            customer_name TEXT NOT NULL,
            amount REAL NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('paid', 'unpaid')),
            issued_on TEXT NOT NULL,
            due_on TEXT NOT NULL,
            UNIQUE (user_id, invoice_number)
        )",
        (),
    )?;

    Ok(())
}

fn map_invoice_row(row: &Row) -> Result<Invoice, rusqlite::Error> {
    Ok(Invoice {
        id: row.get(0)?,
        invoice_number: row.get(1)?,
        customer_name: row.get(2)?,
        amount: row.get(3)?,
        payment_status: row.get(4)?,
        issued_on: row.get(5)?,
        due_on: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        Error,
        auth::UserId,
        db::initialize,
        invoice::{
            InvoiceForm, InvoiceStatus, PaymentStatus, StatusTotals, create_invoice,
            delete_invoice, get_invoices, set_payment_status, summarize_invoices,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn form(number: &str, amount: f64, issued_on: Date, due_on: Date) -> InvoiceForm {
        InvoiceForm {
            invoice_number: number.to_owned(),
            customer_name: "Acme".to_owned(),
            amount,
            issued_on,
            due_on,
            payment_status: PaymentStatus::Unpaid,
        }
    }

    #[test]
    fn status_depends_on_due_date_and_payment() {
        let conn = get_test_connection();
        let invoice = create_invoice(
            &UserId::new("user_1"),
            form("INV-1", 100.0, date!(2025 - 01 - 01), date!(2025 - 01 - 31)),
            &conn,
        )
        .unwrap();

        assert_eq!(invoice.status(date!(2025 - 01 - 31)), InvoiceStatus::Unpaid);
        assert_eq!(invoice.status(date!(2025 - 02 - 01)), InvoiceStatus::Overdue);

        let paid =
            set_payment_status(&UserId::new("user_1"), invoice.id, PaymentStatus::Paid, &conn)
                .unwrap();
        assert_eq!(paid.status(date!(2025 - 02 - 01)), InvoiceStatus::Paid);
    }

    #[test]
    fn due_date_before_issue_date_is_rejected() {
        let conn = get_test_connection();
        let issued_on = date!(2025 - 02 - 01);
        let due_on = date!(2025 - 01 - 31);

        let result = create_invoice(
            &UserId::new("user_1"),
            form("INV-1", 100.0, issued_on, due_on),
            &conn,
        );

        assert_eq!(result, Err(Error::DueBeforeIssue { issued_on, due_on }));
    }

    #[test]
    fn invoice_number_is_unique_per_user() {
        let conn = get_test_connection();
        let user = UserId::new("user_1");
        let day = date!(2025 - 01 - 01);
        create_invoice(&user, form("INV-1", 1.0, day, day), &conn).unwrap();

        assert_eq!(
            create_invoice(&user, form("INV-1", 2.0, day, day), &conn),
            Err(Error::DuplicateInvoiceNumber("INV-1".to_owned()))
        );
        assert!(create_invoice(&UserId::new("user_2"), form("INV-1", 2.0, day, day), &conn).is_ok());
    }

    #[test]
    fn list_is_newest_issue_first() {
        let conn = get_test_connection();
        let user = UserId::new("user_1");
        create_invoice(&user, form("A", 1.0, date!(2025 - 01 - 01), date!(2025 - 01 - 01)), &conn).unwrap();
        create_invoice(&user, form("B", 1.0, date!(2025 - 03 - 01), date!(2025 - 03 - 01)), &conn).unwrap();

        let numbers: Vec<String> = get_invoices(&user, &conn)
            .unwrap()
            .into_iter()
            .map(|invoice| invoice.invoice_number)
            .collect();

        assert_eq!(numbers, ["B", "A"]);
    }

    #[test]
    fn summary_groups_by_effective_status() {
        let conn = get_test_connection();
        let user = UserId::new("user_1");
        let jan = date!(2025 - 01 - 01);
        let mar = date!(2025 - 03 - 31);
        create_invoice(&user, form("A", 100.0, jan, jan), &conn).unwrap();
        create_invoice(&user, form("B", 50.0, jan, mar), &conn).unwrap();
        let paid = create_invoice(&user, form("C", 25.0, jan, jan), &conn).unwrap();
        set_payment_status(&user, paid.id, PaymentStatus::Paid, &conn).unwrap();

        let summary = summarize_invoices(&get_invoices(&user, &conn).unwrap(), date!(2025 - 02 - 15));

        assert_eq!(summary.paid, StatusTotals { count: 1, amount: 25.0 });
        assert_eq!(summary.unpaid, StatusTotals { count: 1, amount: 50.0 });
        assert_eq!(summary.overdue, StatusTotals { count: 1, amount: 100.0 });
    }

    #[test]
    fn updating_or_deleting_other_users_invoice_fails() {
        let conn = get_test_connection();
        let day = date!(2025 - 01 - 01);
        let invoice = create_invoice(&UserId::new("user_1"), form("A", 1.0, day, day), &conn).unwrap();
        let intruder = UserId::new("user_2");

        assert_eq!(
            set_payment_status(&intruder, invoice.id, PaymentStatus::Paid, &conn),
            Err(Error::UpdateMissingInvoice)
        );
        assert_eq!(
            delete_invoice(&intruder, invoice.id, &conn),
            Err(Error::DeleteMissingInvoice)
        );
    }
}
