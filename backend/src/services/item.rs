//! Catalog item service

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use shared::models::{Item, ItemInput};
use shared::validate_item;

use crate::error::{AppError, AppResult};
use crate::store::RecordStore;

#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn RecordStore>,
}

impl ItemService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn check(input: &ItemInput) -> AppResult<()> {
        input.validate()?;
        validate_item(input).map_err(|(field, message)| AppError::validation(field, message))
    }

    pub async fn create_item(&self, input: ItemInput) -> AppResult<Item> {
        Self::check(&input)?;
        let item = self.store.create_item(input).await?;
        tracing::info!(item_id = %item.id, name = %item.name_en, "Item created");
        Ok(item)
    }

    /// All items by English name
    pub async fn list_items(&self) -> AppResult<Vec<Item>> {
        self.store.list_items().await
    }

    pub async fn get_item(&self, id: Uuid) -> AppResult<Item> {
        self.store.get_item(id).await?.ok_or_else(|| {
            tracing::warn!(item_id = %id, "Item not found");
            AppError::NotFound("Item".to_string())
        })
    }

    /// Replace every field of an item
    ///
    /// Existing bills keep the rate captured on their lines.
    pub async fn update_item(&self, id: Uuid, input: ItemInput) -> AppResult<Item> {
        Self::check(&input)?;
        let item = self.store.update_item(id, input).await?;
        tracing::info!(item_id = %id, "Item updated");
        Ok(item)
    }

    /// Delete an item along with every bill line referencing it
    pub async fn delete_item(&self, id: Uuid) -> AppResult<Item> {
        let item = self.store.delete_item(id).await?;
        tracing::info!(item_id = %id, "Item deleted, bill lines referencing it removed");
        Ok(item)
    }
}
