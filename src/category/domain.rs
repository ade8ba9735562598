//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, transaction_type::TransactionType};

/// The most characters a category name may have.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 32;

/// A validated category name with 1 to [MAX_CATEGORY_NAME_LENGTH] characters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidCategoryName] if `name` is
    /// empty after trimming or longer than [MAX_CATEGORY_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();
        let length = name.chars().count();

        if length == 0 || length > MAX_CATEGORY_NAME_LENGTH {
            Err(Error::InvalidCategoryName {
                name: name.to_owned(),
                max: MAX_CATEGORY_NAME_LENGTH,
            })
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category.
pub type CategoryId = crate::database_id::DatabaseId;

/// A user defined category for transactions, e.g. "Sales" as income or "Rent" as an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub icon: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
}

/// Whether a missing category called `name` may be created on the fly.
///
/// True when `name` contains "bank" or "ledger", ignoring case.
pub fn qualifies_for_auto_creation(name: &str) -> bool {
    let name = name.to_lowercase();

    name.contains("bank") || name.contains("ledger")
}
