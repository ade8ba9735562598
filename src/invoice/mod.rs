//! Invoices issued to customers and whether they have been paid.

mod core;
mod endpoints;

pub use core::{
    Invoice, InvoiceForm, InvoiceStatus, InvoiceSummary, PaymentStatus, StatusTotals,
    create_invoice, create_invoice_table, delete_invoice, get_invoices, set_payment_status,
    summarize_invoices,
};
pub use endpoints::{
    create_invoice_endpoint, delete_invoice_endpoint, get_invoice_summary_endpoint,
    get_invoices_endpoint, update_invoice_endpoint,
};
