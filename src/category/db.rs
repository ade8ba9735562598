//! Database operations for categories.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    auth::UserId,
    category::{Category, CategoryName, qualifies_for_auto_creation},
    error::is_unique_violation,
    transaction_type::TransactionType,
};

/// Create a category and return it with its generated ID.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategory] if the user already has a category with the same name and type,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    user_id: &UserId,
    name: CategoryName,
    icon: &str,
    category_type: TransactionType,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "INSERT INTO category (user_id, name, icon, type) VALUES (?1, ?2, ?3, ?4)
             RETURNING id, name, icon, type",
        )?
        .query_row(
            (user_id.as_str(), name.as_ref(), icon, category_type),
            map_row,
        )
        .map_err(|error| {
            if is_unique_violation(&error) {
                Error::DuplicateCategory(name.to_string())
            } else {
                error.into()
            }
        })
}

/// Find the category of `user_id` with `name` and `category_type`.
///
/// Returns `Ok(None)` if there is no such category.
pub fn find_category(
    user_id: &UserId,
    name: &str,
    category_type: TransactionType,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, icon, type FROM category
             WHERE user_id = ?1 AND name = ?2 AND type = ?3",
        )?
        .query_row((user_id.as_str(), name, category_type), map_row)
        .optional()
        .map_err(Error::from)
}

/// Find the category to file a transaction under, creating bank and ledger
/// categories on first use.
///
/// A category that does not exist is created with the default icon for
/// `category_type` when [qualifies_for_auto_creation] is true for `name`.
///
/// # Errors
/// This function will return a:
/// - [Error::CategoryNotFound] if the category does not exist and cannot be created automatically,
/// - or [Error::SqlError] if there is some other SQL error.
///
/// Automatically created names skip the length limit of [CategoryName::new].
pub fn resolve_category(
    user_id: &UserId,
    name: &str,
    category_type: TransactionType,
    connection: &Connection,
) -> Result<Category, Error> {
    if let Some(category) = find_category(user_id, name, category_type, connection)? {
        return Ok(category);
    }

    if !qualifies_for_auto_creation(name) {
        return Err(Error::CategoryNotFound(name.to_owned()));
    }

    let name = name.trim();
    tracing::info!("Creating {category_type} category \"{name}\" for user {user_id}");

    create_category(
        user_id,
        CategoryName::new_unchecked(name),
        category_type.default_icon(),
        category_type,
        connection,
    )
}

/// Retrieve the categories of `user_id` ordered alphabetically by name,
/// optionally only those of `category_type`.
pub fn get_categories(
    user_id: &UserId,
    category_type: Option<TransactionType>,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, icon, type FROM category
             WHERE user_id = ?1 AND (?2 IS NULL OR type = ?2)
             ORDER BY name ASC, type ASC",
        )?
        .query_map((user_id.as_str(), category_type), map_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Delete the category of `user_id` with `name` and `category_type`.
///
/// Transactions keep the category name and icon they were created with.
///
/// # Errors
/// Returns [Error::DeleteMissingCategory] if there is no such category.
pub fn delete_category(
    user_id: &UserId,
    name: &str,
    category_type: TransactionType,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM category WHERE user_id = ?1 AND name = ?2 AND type = ?3",
        (user_id.as_str(), name, category_type),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            icon TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            UNIQUE (name, user_id, type)
        );

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let icon = row.get(2)?;
    let category_type = row.get(3)?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        icon,
        category_type,
    })
}
