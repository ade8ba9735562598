//! Stock kept by the business: what is on hand, what it is worth and what
//! needs reordering.

mod core;
mod endpoints;

pub use core::{
    InventoryItem, InventoryItemForm, InventorySummary, create_inventory_item,
    create_inventory_table, delete_inventory_item, get_inventory, summarize_inventory,
};
pub use endpoints::{
    create_inventory_item_endpoint, delete_inventory_item_endpoint, get_inventory_endpoint,
    get_inventory_summary_endpoint,
};
