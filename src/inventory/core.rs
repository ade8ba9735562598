//! Defines the inventory models and database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error, auth::UserId, database_id::InventoryItemId, error::is_unique_violation,
};

/// A stocked product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub name: String,
    /// Stock keeping unit, unique among the user's items.
    pub sku: String,
    /// Units on hand.
    pub quantity: u32,
    /// Price of a single unit.
    pub unit_price: f64,
    /// The item is low on stock when `quantity` drops to this level.
    pub reorder_level: u32,
}

impl InventoryItem {
    /// The value of the units on hand.
    pub fn stock_value(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

/// The request body for adding an item.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryItemForm {
    pub name: String,
    pub sku: String,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(default)]
    pub reorder_level: u32,
}

/// Totals over all of a user's inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySummary {
    pub item_count: usize,
    pub total_units: u64,
    pub total_value: f64,
    /// Items at or below their reorder level, ordered by name.
    pub low_stock: Vec<InventoryItem>,
}

/// Add an item to the inventory of `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyField] if the name or SKU is blank,
/// - [Error::InvalidAmount] if the unit price is negative or not finite,
/// - [Error::DuplicateSku] if the user already has an item with the SKU,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_inventory_item(
    user_id: &UserId,
    form: InventoryItemForm,
    connection: &Connection,
) -> Result<InventoryItem, Error> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyField("name"));
    }

    let sku = form.sku.trim();
    if sku.is_empty() {
        return Err(Error::EmptyField("sku"));
    }

    if !form.unit_price.is_finite() || form.unit_price < 0.0 {
        return Err(Error::InvalidAmount(form.unit_price));
    }

    connection
        .prepare(
            "INSERT INTO inventory_item (user_id, name, sku, quantity, unit_price, reorder_level)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, name, sku, quantity, unit_price, reorder_level",
        )?
        .query_row(
            (
                user_id.as_str(),
                name,
                sku,
                form.quantity,
                form.unit_price,
                form.reorder_level,
            ),
            map_item_row,
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                Error::DuplicateSku(sku.to_owned())
            } else {
                error.into()
            }
        })
}

/// Retrieve the inventory of `user_id` ordered by name.
pub fn get_inventory(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Vec<InventoryItem>, Error> {
    connection
        .prepare(
            "SELECT id, name, sku, quantity, unit_price, reorder_level FROM inventory_item
             WHERE user_id = ?1 ORDER BY name COLLATE NOCASE ASC, id ASC",
        )?
        .query_map([user_id.as_str()], map_item_row)?
        .map(|maybe_item| maybe_item.map_err(Error::from))
        .collect()
}

/// Compute the inventory totals for `items`.
pub fn summarize_inventory(items: Vec<InventoryItem>) -> InventorySummary {
    let item_count = items.len();
    let total_units = items.iter().map(|item| u64::from(item.quantity)).sum();
    let total_value = items.iter().map(InventoryItem::stock_value).sum();
    let low_stock = items.into_iter().filter(InventoryItem::is_low_stock).collect();

    InventorySummary {
        item_count,
        total_units,
        total_value,
        low_stock,
    }
}

/// Delete the item `id` of `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingInventoryItem] if the user has no such item.
pub fn delete_inventory_item(
    user_id: &UserId,
    id: InventoryItemId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM inventory_item WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_str()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingInventoryItem);
    }

    Ok(())
}

pub fn create_inventory_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS inventory_item (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            sku TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity >= 0),
            unit_price REAL NOT NULL CHECK (unit_price >= 0),
            reorder_level INTEGER NOT NULL DEFAULT 0,
            UNIQUE (user_id, sku)
        )",
        (),
    )?;

    Ok(())
}

fn map_item_row(row: &Row) -> Result<InventoryItem, rusqlite::Error> {
    Ok(InventoryItem {
        id: row.get(0)?,
        name: row.get(1)?,
        sku: row.get(2)?,
        quantity: row.get(3)?,
        unit_price: row.get(4)?,
        reorder_level: row.get(5)?,
    })
}
