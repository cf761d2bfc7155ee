//! # Shop Registry
//!
//! Shared access to many shops from several threads.
//!
//! Each shop sits behind its own lock, so all offer mutation and trading for
//! one shop is serialized while different shops proceed independently. The
//! map itself is only locked long enough to look a shop up.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{ShopError, ShopResult};
use crate::shop::PlayerShop;

/// Unique identifier for a shop.
pub type ShopId = u32;

/// A shop shared between threads.
pub type SharedShop = Arc<Mutex<PlayerShop>>;

/// All registered shops.
#[derive(Debug, Default)]
pub struct ShopRegistry {
    shops: RwLock<HashMap<ShopId, SharedShop>>,
}

impl ShopRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shop under its own id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the id is already taken.
    pub fn register(&self, shop: PlayerShop) -> ShopResult<SharedShop> {
        let id = shop.id();
        let mut shops = self.shops.write();
        if shops.contains_key(&id) {
            return Err(ShopError::InvalidArgument(format!("shop id {id} is already registered")));
        }
        let shared = Arc::new(Mutex::new(shop));
        shops.insert(id, Arc::clone(&shared));
        Ok(shared)
    }

    /// Removes a shop, returning it.
    pub fn remove(&self, id: ShopId) -> Option<SharedShop> {
        self.shops.write().remove(&id)
    }

    /// Gets a shop handle.
    #[must_use]
    pub fn get(&self, id: ShopId) -> Option<SharedShop> {
        self.shops.read().get(&id).cloned()
    }

    /// Runs `f` with exclusive access to one shop.
    ///
    /// # Errors
    ///
    /// Returns `UnknownShop` if no shop has this id.
    pub fn with_shop<R>(&self, id: ShopId, f: impl FnOnce(&mut PlayerShop) -> R) -> ShopResult<R> {
        let shop = self.get(id).ok_or(ShopError::UnknownShop(id))?;
        let mut guard = shop.lock();
        Ok(f(&mut guard))
    }

    /// Ids of all shops whose offers changed since they were last saved.
    #[must_use]
    pub fn dirty_shops(&self) -> Vec<ShopId> {
        let handles: Vec<(ShopId, SharedShop)> = self
            .shops
            .read()
            .iter()
            .map(|(&id, shop)| (id, Arc::clone(shop)))
            .collect();
        let mut dirty: Vec<ShopId> = handles
            .into_iter()
            .filter(|(_, shop)| shop.lock().offers().is_dirty())
            .map(|(id, _)| id)
            .collect();
        dirty.sort_unstable();
        dirty
    }

    /// Number of registered shops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shops.read().len()
    }

    /// Returns true if no shops are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shops.read().is_empty()
    }
}
