//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/customers/{customer_id}', use [format_endpoint].

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for checking that the server is up.
pub const HEALTH: &str = "/api/health";
/// The route to get and update the caller's settings.
pub const USER_SETTINGS: &str = "/api/user-settings";
/// The route to list, create and delete categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the years that have history.
pub const HISTORY_PERIODS: &str = "/api/history/periods";
/// The route for monthly or daily income and expense totals.
pub const HISTORY: &str = "/api/history";
/// The route for total income and expense over a date range.
pub const BALANCE_STATS: &str = "/api/stats/balance";
/// The route for totals per category over a date range.
pub const CATEGORY_STATS: &str = "/api/stats/categories";
pub const CUSTOMERS: &str = "/api/customers";
pub const CUSTOMER: &str = "/api/customers/{customer_id}";
pub const INVENTORY: &str = "/api/inventory";
pub const INVENTORY_SUMMARY: &str = "/api/inventory/summary";
pub const INVENTORY_ITEM: &str = "/api/inventory/{item_id}";
pub const STAFF: &str = "/api/staff";
pub const STAFF_SUMMARY: &str = "/api/staff/summary";
pub const STAFF_MEMBER: &str = "/api/staff/{staff_id}";
pub const INVOICES: &str = "/api/invoices";
pub const INVOICE_SUMMARY: &str = "/api/invoices/summary";
pub const INVOICE: &str = "/api/invoices/{invoice_id}";
/// The route to list and create ledger entries, optionally for one ledger.
pub const LEDGER: &str = "/api/ledger";
pub const LEDGER_SUMMARY: &str = "/api/ledger/summary";
pub const LEDGER_ENTRY: &str = "/api/ledger/{entry_id}";
/// The route for the daybook grouped by day.
pub const DAYBOOK: &str = "/api/daybook";
pub const DAYBOOK_ENTRY: &str = "/api/daybook/{entry_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        for endpoint in [
            endpoints::COFFEE,
            endpoints::HEALTH,
            endpoints::USER_SETTINGS,
            endpoints::CATEGORIES,
            endpoints::TRANSACTIONS,
            endpoints::HISTORY_PERIODS,
            endpoints::HISTORY,
            endpoints::BALANCE_STATS,
            endpoints::CATEGORY_STATS,
            endpoints::CUSTOMERS,
            endpoints::INVENTORY,
            endpoints::INVENTORY_SUMMARY,
            endpoints::STAFF,
            endpoints::STAFF_SUMMARY,
            endpoints::INVOICES,
            endpoints::INVOICE_SUMMARY,
            endpoints::LEDGER,
            endpoints::LEDGER_SUMMARY,
            endpoints::DAYBOOK,
        ] {
            assert_endpoint_is_valid_uri(endpoint);
        }

        for endpoint in [
            endpoints::TRANSACTION,
            endpoints::CUSTOMER,
            endpoints::INVENTORY_ITEM,
            endpoints::STAFF_MEMBER,
            endpoints::INVOICE,
            endpoints::LEDGER_ENTRY,
            endpoints::DAYBOOK_ENTRY,
        ] {
            assert_endpoint_is_valid_uri(&format_endpoint(endpoint, 1));
        }
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/hello/{world}/bye", 1);

        assert_eq!(formatted_path, "/hello/1/bye");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
