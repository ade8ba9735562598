//! Running monthly and yearly income/expense totals kept alongside transactions.

mod db;
mod endpoint;

pub use db::{
    HistoryRow, add_to_history, create_history_tables, get_history_periods, get_month_history,
    get_year_history,
};
pub use endpoint::{get_history_endpoint, get_history_periods_endpoint};
