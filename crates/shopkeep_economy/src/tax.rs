//! # Trade Taxes
//!
//! A tax policy turns a price into what the shop owner actually earns.
//! All math is integer; percentages are whole numbers.

use serde::{Deserialize, Serialize};

/// Computes the owner's proceeds for a price.
pub trait TaxPolicy {
    /// Amount left after taxes. Never exceeds `price`.
    fn amount_after_taxes(&self, price: u32) -> u32;
}

impl<F> TaxPolicy for F
where
    F: Fn(u32) -> u32,
{
    fn amount_after_taxes(&self, price: u32) -> u32 {
        self(price).min(price)
    }
}

/// A whole-number percentage tax.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentageTax {
    /// Tax rate in percent (0 to 100).
    #[serde(default)]
    pub rate: u32,
    /// Round the tax up instead of down.
    #[serde(default)]
    pub round_up: bool,
}

impl PercentageTax {
    /// No taxes at all.
    pub const NONE: Self = Self {
        rate: 0,
        round_up: false,
    };

    /// Creates a tax rounding down, capped at 100%.
    #[must_use]
    pub const fn new(rate: u32) -> Self {
        Self {
            rate: if rate > 100 { 100 } else { rate },
            round_up: false,
        }
    }

    /// Sets the rounding direction.
    #[must_use]
    pub const fn with_round_up(mut self, round_up: bool) -> Self {
        self.round_up = round_up;
        self
    }

    /// The taxes owed on `price`.
    #[must_use]
    pub fn taxes(&self, price: u32) -> u32 {
        let rate = u64::from(self.rate.min(100));
        let scaled = u64::from(price) * rate;
        let taxes = if self.round_up {
            scaled.div_ceil(100)
        } else {
            scaled / 100
        };
        // taxes <= price because rate <= 100
        u32::try_from(taxes).unwrap_or(price)
    }
}

impl TaxPolicy for PercentageTax {
    fn amount_after_taxes(&self, price: u32) -> u32 {
        if self.rate == 0 {
            return price;
        }
        price.saturating_sub(self.taxes(price))
    }
}
