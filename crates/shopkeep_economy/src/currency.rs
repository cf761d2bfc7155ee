//! # Currency System
//!
//! Two-tier currency: a base denomination worth 1 unit and an optional high
//! denomination worth more.
//!
//! ## Decomposition
//!
//! ```text
//! amount > high_currency_min_cost && high enabled:
//!     high = amount / high.value
//!     base = amount - high * high.value
//! otherwise:
//!     high = 0
//!     base = amount
//! ```
//!
//! The rule is greedy and deliberately limited to two tiers. Since the base
//! value is 1, every non-negative amount decomposes.

use crate::container::Container;
use crate::error::{ShopError, ShopResult};
use crate::item::{ItemData, ItemStack, DEFAULT_MAX_STACK};

/// Default price above which the high currency is used.
pub const DEFAULT_HIGH_CURRENCY_MIN_COST: u32 = 100;

/// Default worth of one high currency item in base units.
pub const DEFAULT_HIGH_CURRENCY_VALUE: u32 = 9;

/// Which currency tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Denomination {
    /// The value-1 currency.
    Base,
    /// The optional higher-value currency.
    High,
}

/// A single currency denomination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Currency {
    /// The item representing this currency.
    pub item: ItemData,
    /// Worth of one item in base units.
    pub value: u32,
    /// Maximum items per container slot.
    pub max_stack: u32,
}

impl Currency {
    /// Creates a stack of `count` currency items.
    #[must_use]
    pub fn stack(&self, count: u32) -> ItemStack {
        self.item.stack(count, self.max_stack)
    }
}

/// An amount split into high and base currency counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CurrencySplit {
    /// Number of high currency items.
    pub high: u32,
    /// Number of base currency items.
    pub base: u32,
}

impl CurrencySplit {
    /// The non-zero parts, high currency first.
    pub fn parts(self) -> impl Iterator<Item = (Denomination, u32)> {
        [(Denomination::High, self.high), (Denomination::Base, self.base)]
            .into_iter()
            .filter(|&(_, count)| count > 0)
    }
}

/// The configured currencies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Currencies {
    base: Currency,
    high: Option<Currency>,
    high_currency_min_cost: u32,
}

impl Currencies {
    /// Creates a currency system with only a base currency.
    #[must_use]
    pub fn new(base_item: ItemData, base_max_stack: u32) -> Self {
        Self {
            base: Currency {
                item: base_item,
                value: 1,
                max_stack: base_max_stack.max(1),
            },
            high: None,
            high_currency_min_cost: 0,
        }
    }

    /// Enables the high currency.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `value` is not above 1 or the item is the
    /// same as the base currency item.
    pub fn with_high(mut self, item: ItemData, value: u32, max_stack: u32) -> ShopResult<Self> {
        if value <= 1 {
            return Err(ShopError::InvalidConfig(format!(
                "high currency value must be greater than 1, got {value}"
            )));
        }
        if item == self.base.item {
            return Err(ShopError::InvalidConfig(format!(
                "high currency item '{item}' is the same as the base currency item"
            )));
        }
        self.high = Some(Currency {
            item,
            value,
            max_stack: max_stack.max(1),
        });
        Ok(self)
    }

    /// Sets the price threshold above which the high currency is used.
    #[must_use]
    pub const fn with_high_currency_min_cost(mut self, min_cost: u32) -> Self {
        self.high_currency_min_cost = min_cost;
        self
    }

    /// The base currency.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> &Currency {
        &self.base
    }

    /// The high currency, if enabled.
    #[inline]
    #[must_use]
    pub const fn high(&self) -> Option<&Currency> {
        self.high.as_ref()
    }

    /// The high currency threshold.
    #[inline]
    #[must_use]
    pub const fn high_currency_min_cost(&self) -> u32 {
        self.high_currency_min_cost
    }

    /// Whether a second, higher-value denomination is configured.
    #[inline]
    #[must_use]
    pub const fn is_high_currency_enabled(&self) -> bool {
        self.high.is_some()
    }

    /// Gets a currency by denomination.
    #[must_use]
    pub fn get(&self, denomination: Denomination) -> Option<&Currency> {
        match denomination {
            Denomination::Base => Some(&self.base),
            Denomination::High => self.high.as_ref(),
        }
    }

    /// Returns which denomination `item` is, if it is currency at all.
    #[must_use]
    pub fn denomination_of(&self, item: &ItemData) -> Option<Denomination> {
        if *item == self.base.item {
            Some(Denomination::Base)
        } else if self.high.as_ref().is_some_and(|h| h.item == *item) {
            Some(Denomination::High)
        } else {
            None
        }
    }

    /// Splits `amount` base units into high and base currency counts.
    #[must_use]
    pub fn decompose(&self, amount: u32) -> CurrencySplit {
        match &self.high {
            Some(high) if amount > self.high_currency_min_cost => {
                let high_count = amount / high.value;
                CurrencySplit {
                    high: high_count,
                    base: amount - high_count * high.value,
                }
            }
            _ => CurrencySplit {
                high: 0,
                base: amount,
            },
        }
    }

    /// Total worth of a split in base units.
    #[must_use]
    pub fn value_of(&self, split: CurrencySplit) -> u64 {
        let high_value = self.high.as_ref().map_or(0, |h| u64::from(h.value));
        u64::from(split.high) * high_value + u64::from(split.base)
    }

    /// Total currency value held by a container, in base units.
    #[must_use]
    pub fn value_in(&self, container: &Container) -> u64 {
        let base = u64::from(container.count_similar(&self.base.item));
        let high = self.high.as_ref().map_or(0, |h| {
            u64::from(container.count_similar(&h.item)) * u64::from(h.value)
        });
        base + high
    }
}

impl Default for Currencies {
    /// Emeralds as base currency, emerald blocks worth 9 above a price of 100.
    fn default() -> Self {
        let mut currencies = Self::new(ItemData::new("emerald"), DEFAULT_MAX_STACK)
            .with_high_currency_min_cost(DEFAULT_HIGH_CURRENCY_MIN_COST);
        currencies.high = Some(Currency {
            item: ItemData::new("emerald_block"),
            value: DEFAULT_HIGH_CURRENCY_VALUE,
            max_stack: DEFAULT_MAX_STACK,
        });
        currencies
    }
}
