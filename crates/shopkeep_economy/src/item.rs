//! # Item Descriptors
//!
//! Immutable, value-comparable descriptions of items.
//!
//! [`ItemData`] is the identity used for trading: kind plus significant
//! metadata. [`ItemStack`] pairs that identity with a quantity and the kind's
//! maximum stack size. Two stacks are *similar* when their `ItemData` match,
//! regardless of how many items each holds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default maximum stack size for items that do not declare one.
pub const DEFAULT_MAX_STACK: u32 = 64;

/// Identity of an item for trading purposes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemData {
    /// Item kind, e.g. `"wheat"`.
    pub kind: String,
    /// Significant metadata (display name, enchantments, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl ItemData {
    /// Creates item data without metadata.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            meta: BTreeMap::new(),
        }
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Returns true if the kind is blank, i.e. this describes no item at all.
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.kind.trim().is_empty()
    }

    /// Creates a stack of this item.
    #[must_use]
    pub fn stack(&self, amount: u32, max_stack: u32) -> ItemStack {
        ItemStack::new(self.clone(), amount).with_max_stack(max_stack)
    }
}

impl fmt::Display for ItemData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.kind)?;
        if !self.meta.is_empty() {
            f.write_str("{")?;
            for (i, (key, value)) in self.meta.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{key}={value}")?;
            }
            f.write_str("}")?;
        }
        Ok(())
    }
}

/// A quantity of one item.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// What the stack holds.
    pub data: ItemData,
    /// Number of items in this stack.
    pub amount: u32,
    /// Maximum number of items per container slot.
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
}

const fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

impl ItemStack {
    /// Creates a stack with the default max stack size.
    #[must_use]
    pub fn new(data: ItemData, amount: u32) -> Self {
        Self {
            data,
            amount,
            max_stack: DEFAULT_MAX_STACK,
        }
    }

    /// Sets the max stack size (at least 1).
    #[must_use]
    pub fn with_max_stack(mut self, max_stack: u32) -> Self {
        self.max_stack = max_stack.max(1);
        self
    }

    /// Returns a copy of this stack holding `amount` items.
    #[must_use]
    pub fn with_amount(&self, amount: u32) -> Self {
        Self {
            data: self.data.clone(),
            amount,
            max_stack: self.max_stack,
        }
    }

    /// Returns true if the stack holds nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount == 0 || self.data.is_blank()
    }

    /// Returns true if both stacks are interchangeable for trading.
    #[inline]
    #[must_use]
    pub fn is_similar(&self, other: &Self) -> bool {
        self.data == other.data
    }

    /// Returns true if this stack holds the given item.
    #[inline]
    #[must_use]
    pub fn is_of(&self, data: &ItemData) -> bool {
        &self.data == data
    }
}

impl fmt::Display for ItemStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x {}", self.amount, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_ignores_amount() {
        let wheat = ItemData::new("wheat");
        let a = ItemStack::new(wheat.clone(), 64);
        let b = ItemStack::new(wheat, 3);
        assert!(a.is_similar(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_similarity_respects_meta() {
        let plain = ItemStack::new(ItemData::new("sword"), 1);
        let named = ItemStack::new(ItemData::new("sword").with_meta("name", "Excalibur"), 1);
        assert!(!plain.is_similar(&named));
    }

    #[test]
    fn test_blank_is_empty() {
        assert!(ItemStack::new(ItemData::new("  "), 5).is_empty());
        assert!(ItemStack::new(ItemData::new("dirt"), 0).is_empty());
    }

    #[test]
    fn test_display() {
        let data = ItemData::new("sword").with_meta("name", "Excalibur");
        assert_eq!(data.stack(1, 1).to_string(), "1x sword{name=Excalibur}");
    }
}
