//! # Shop Containers
//!
//! Fixed-capacity slot storage backing a shop.
//!
//! A [`Container`] is a plain value: cloning it is how a trade takes its
//! scratch snapshot. Slots never grow or shrink after creation.

use serde::{Deserialize, Serialize};

use crate::item::{ItemData, ItemStack};

/// Default number of slots (a single chest).
pub const DEFAULT_CONTAINER_SIZE: usize = 27;

/// Fixed-capacity item storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    slots: Vec<Option<ItemStack>>,
}

impl Container {
    /// Creates an empty container with `capacity` slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Creates a container from raw slot contents.
    ///
    /// Empty stacks are normalized to empty slots.
    #[must_use]
    pub fn from_slots(slots: Vec<Option<ItemStack>>) -> Self {
        let slots = slots
            .into_iter()
            .map(|slot| slot.filter(|stack| !stack.is_empty()))
            .collect();
        Self { slots }
    }

    /// Returns the total number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Gets the stack in a slot.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Read-only view of all slots.
    #[must_use]
    pub fn contents(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    /// Iterates over the non-empty stacks.
    pub fn stacks(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }

    /// Number of empty slots.
    #[must_use]
    pub fn free_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// Returns true if every slot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Counts items similar to `data` across all slots.
    #[must_use]
    pub fn count_similar(&self, data: &ItemData) -> u32 {
        self.stacks()
            .filter(|s| s.is_of(data))
            .fold(0u32, |total, s| total.saturating_add(s.amount))
    }

    /// Adds items to the container.
    ///
    /// First tops up existing similar stacks, then uses empty slots. Items
    /// that do not fit are left out.
    ///
    /// # Returns
    ///
    /// The amount that could not be added (0 if everything fit).
    pub fn add_items(&mut self, stack: &ItemStack) -> u32 {
        if stack.is_empty() {
            return 0;
        }
        let mut remaining = stack.amount;

        // First, try to add to existing stacks
        for slot in self.slots.iter_mut().flatten() {
            if remaining == 0 {
                break;
            }
            if slot.is_similar(stack) {
                let limit = slot.max_stack.min(stack.max_stack);
                if slot.amount < limit {
                    let can_add = (limit - slot.amount).min(remaining);
                    slot.amount += can_add;
                    remaining -= can_add;
                }
            }
        }

        // Then, use empty slots
        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                let add_count = remaining.min(stack.max_stack);
                *slot = Some(stack.with_amount(add_count));
                remaining -= add_count;
            }
        }

        remaining
    }

    /// Removes items similar to `stack`, `stack.amount` in total.
    ///
    /// Removal is all-or-nothing: if the container holds fewer items than
    /// requested, nothing is removed.
    ///
    /// # Returns
    ///
    /// The shortfall (0 on success).
    pub fn remove_items(&mut self, stack: &ItemStack) -> u32 {
        let available = self.count_similar(&stack.data);
        if available < stack.amount {
            return stack.amount - available;
        }

        let mut remaining = stack.amount;
        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            let Some(held) = slot.as_mut() else {
                continue;
            };
            if held.is_similar(stack) {
                let remove_count = held.amount.min(remaining);
                held.amount -= remove_count;
                remaining -= remove_count;
                if held.amount == 0 {
                    *slot = None;
                }
            }
        }

        0
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER_SIZE)
    }
}
