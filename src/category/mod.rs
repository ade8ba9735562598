//! Categories for grouping transactions, e.g. "Sales" or "Rent".

mod create;
mod db;
mod delete;
mod domain;
mod list;

pub use create::create_category_endpoint;
pub use db::{
    create_category, create_category_table, delete_category, find_category, get_categories,
    resolve_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryName, qualifies_for_auto_creation};
pub use list::get_categories_endpoint;
