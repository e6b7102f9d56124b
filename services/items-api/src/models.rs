// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Item models.

use crate::error::{AppError, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Item identifier.
pub type ItemId = u64;

/// A stored item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
}

impl Item {
    /// Reject items no client should be able to store.
    pub fn validate(self) -> Result<Self> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name cannot be empty".to_string()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::Validation(
                "price must be a non-negative number".to_string(),
            ));
        }
        Ok(self)
    }

    /// Apply the fields present in `patch`.
    pub fn apply(&mut self, patch: ItemPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
    }
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemPatch {
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
}

/// Marks a field as present, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// An item without its description.
#[derive(Debug, Clone, Serialize)]
pub struct ItemSummary {
    pub name: String,
    pub price: f64,
}

impl From<Item> for ItemSummary {
    fn from(item: Item) -> Self {
        Self {
            name: item.name,
            price: item.price,
        }
    }
}

/// Response for create and update.
#[derive(Debug, Serialize)]
pub struct ItemEnvelope {
    pub id: ItemId,
    pub item: Item,
}

/// Response for delete.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: Item,
}

/// Query for reads.
#[derive(Debug, Default, Deserialize)]
pub struct ReadQuery {
    #[serde(default)]
    pub include_desc: bool,
}
