// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-memory item table.
//!
//! Identifiers come from a monotonic counter, so an id is never reused
//! after a delete.

use crate::error::{AppError, Result};
use crate::models::{Item, ItemId, ItemPatch};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Thread-safe item store.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: RwLock<BTreeMap<ItemId, Item>>,
    next_id: AtomicU64,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item and return its id.
    pub async fn create(&self, item: Item) -> ItemId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.items.write().await.insert(id, item);
        debug!(id, "Item created");
        id
    }

    pub async fn get(&self, id: ItemId) -> Result<Item> {
        self.items
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    /// Replace an existing item.
    pub async fn replace(&self, id: ItemId, item: Item) -> Result<Item> {
        let mut items = self.items.write().await;
        let slot = items.get_mut(&id).ok_or(AppError::NotFound)?;
        *slot = item;
        Ok(slot.clone())
    }

    /// Merge a partial update into an existing item.
    ///
    /// The merged item must still be valid; otherwise nothing changes.
    pub async fn patch(&self, id: ItemId, patch: ItemPatch) -> Result<Item> {
        let mut items = self.items.write().await;
        let slot = items.get_mut(&id).ok_or(AppError::NotFound)?;
        let mut updated = slot.clone();
        updated.apply(patch);
        *slot = updated.validate()?;
        Ok(slot.clone())
    }

    pub async fn delete(&self, id: ItemId) -> Result<Item> {
        let removed = self.items.write().await.remove(&id);
        if removed.is_some() {
            debug!(id, "Item deleted");
        }
        removed.ok_or(AppError::NotFound)
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}
