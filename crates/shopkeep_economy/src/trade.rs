//! # Trade Executor
//!
//! **ATOMIC**: a trade either applies completely or not at all.
//!
//! The executor never touches the caller's container. It clones it into a
//! scratch snapshot, applies every removal and addition there, and hands the
//! snapshot back only when all steps succeeded. The caller installs it.
//!
//! ## Selling shop
//!
//! ```text
//! 1. Re-validate recipe against the live offer   -> UnexpectedTrade
//! 2. Remove the sold items from the snapshot      -> InsufficientStock
//! 3. Apply taxes to the price                     (zero earnings is fine)
//! 4. Add high currency, then base currency;
//!    high items that do not fit fall back to base
//! 5. Base currency does not fit                   -> InsufficientStorageSpace
//! ```
//!
//! ## Buying shop
//!
//! ```text
//! 1. Re-validate recipe against the live offer   -> UnexpectedTrade
//! 2. Remove `price` worth of currency             -> InsufficientStock
//!    (base first, then high; change paid back in base currency)
//! 3. Add the bought items                         -> InsufficientStorageSpace
//! ```

use crate::container::Container;
use crate::currency::{Currencies, CurrencySplit};
use crate::error::{ShopError, ShopResult};
use crate::item::ItemStack;
use crate::offers::{OfferStore, PriceOffer};
use crate::recipe::{ShopDirection, TradingRecipe};
use crate::tax::TaxPolicy;

/// A proposed trade. Not stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trade {
    /// Name of the trading player.
    pub player: String,
    /// The recipe the player chose.
    pub recipe: TradingRecipe,
    /// First item the player offered.
    pub offered1: ItemStack,
    /// Second item the player offered.
    pub offered2: Option<ItemStack>,
    /// The offered items are in reverse order relative to the recipe costs.
    pub item_order_swapped: bool,
}

impl Trade {
    /// Creates a trade offering exactly the recipe's cost items.
    #[must_use]
    pub fn new(player: impl Into<String>, recipe: TradingRecipe) -> Self {
        let offered1 = recipe.cost1.clone();
        let offered2 = recipe.cost2.clone();
        Self {
            player: player.into(),
            recipe,
            offered1,
            offered2,
            item_order_swapped: false,
        }
    }

    /// The offered items, reordered to line up with the recipe costs.
    fn offered_in_recipe_order(&self) -> (Option<&ItemStack>, Option<&ItemStack>) {
        if self.item_order_swapped {
            (self.offered2.as_ref(), Some(&self.offered1))
        } else {
            (Some(&self.offered1), self.offered2.as_ref())
        }
    }
}

/// The net effect of a successful trade.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// New container contents, to be committed by the caller.
    pub contents: Container,
    /// Stacks taken out of the container.
    pub removed: Vec<ItemStack>,
    /// Stacks put into the container.
    pub added: Vec<ItemStack>,
}

impl Settlement {
    fn new(contents: Container) -> Self {
        Self {
            contents,
            removed: Vec::new(),
            added: Vec::new(),
        }
    }
}

/// Validates and executes trades for one shop.
#[derive(Clone, Copy)]
pub struct TradeExecutor<'a> {
    /// Which way the shop trades.
    pub direction: ShopDirection,
    /// The shop's authoritative offers.
    pub offers: &'a OfferStore,
    /// Currency configuration.
    pub currencies: &'a Currencies,
    /// Tax applied to selling shop earnings.
    pub tax: &'a dyn TaxPolicy,
}

impl<'a> TradeExecutor<'a> {
    /// Creates an executor.
    #[must_use]
    pub fn new(
        direction: ShopDirection,
        offers: &'a OfferStore,
        currencies: &'a Currencies,
        tax: &'a dyn TaxPolicy,
    ) -> Self {
        Self {
            direction,
            offers,
            currencies,
            tax,
        }
    }

    /// Validates `trade` and computes the resulting container contents.
    ///
    /// `container` is left untouched either way.
    ///
    /// # Errors
    ///
    /// - `UnexpectedTrade` if the recipe no longer matches an offer or the
    ///   offered items do not match the recipe
    /// - `InsufficientStock` if the container lacks items or currency
    /// - `InsufficientStorageSpace` if the container cannot hold the result
    pub fn prepare_trade(&self, trade: &Trade, container: &Container) -> ShopResult<Settlement> {
        let offer = self.validate(trade)?;

        if trade.recipe.out_of_stock {
            return Err(ShopError::insufficient_stock("The trading recipe is out of stock."));
        }

        let settlement = Settlement::new(container.clone());
        match self.direction {
            ShopDirection::Selling => self.settle_sale(offer, settlement),
            ShopDirection::Buying => self.settle_purchase(offer, settlement),
        }
    }

    /// Step 1: the recipe must still match the authoritative offer.
    fn validate(&self, trade: &Trade) -> ShopResult<&'a PriceOffer> {
        let recipe = &trade.recipe;
        let (offered1, offered2) = trade.offered_in_recipe_order();
        let covered = recipe
            .costs()
            .zip([offered1, offered2])
            .all(|(required, offered)| covers(required, offered));
        if !covered {
            return Err(ShopError::unexpected_trade(
                "The offered items do not match the trading recipe!",
            ));
        }

        let traded_item = self.direction.traded_item(recipe);
        let offer = self.offers.get_offer(&traded_item.data).ok_or_else(|| {
            ShopError::unexpected_trade("Could not find the offer corresponding to the trading recipe!")
        })?;

        if offer.amount() != traded_item.amount {
            return Err(ShopError::unexpected_trade(format!(
                "The offer does not match the trading recipe! (offer amount {}, recipe amount {})",
                offer.amount(),
                traded_item.amount
            )));
        }
        Ok(offer)
    }

    fn settle_sale(&self, offer: &PriceOffer, mut settlement: Settlement) -> ShopResult<Settlement> {
        // Remove sold items
        let missing = settlement.contents.remove_items(&offer.item);
        if missing != 0 {
            return Err(ShopError::insufficient_stock(format!(
                "The shop's container does not contain the required items. (missing {missing} of {})",
                offer.item
            )));
        }
        settlement.removed.push(offer.item.clone());

        // Add earnings
        let earnings = self.tax.amount_after_taxes(offer.price);
        if earnings > 0 {
            self.deposit(earnings, &mut settlement)?;
        }
        Ok(settlement)
    }

    /// Adds `amount` base units of currency, high currency first.
    ///
    /// High currency items that do not fit are re-expressed in base currency.
    fn deposit(&self, amount: u32, settlement: &mut Settlement) -> ShopResult<()> {
        let split = self.currencies.decompose(amount);
        let mut remaining = amount;

        if let Some(high) = self.currencies.high() {
            if split.high > 0 {
                let unfit = settlement.contents.add_items(&high.stack(split.high));
                let added = split.high - unfit;
                if added > 0 {
                    remaining -= added * high.value;
                    settlement.added.push(high.stack(added));
                }
            }
        }

        if remaining > 0 {
            let base = self.currencies.base();
            let unfit = settlement.contents.add_items(&base.stack(remaining));
            if unfit != 0 {
                return Err(ShopError::insufficient_storage_space(format!(
                    "The shop's container cannot hold the traded items. ({unfit} of {} did not fit)",
                    base.item
                )));
            }
            settlement.added.push(base.stack(remaining));
        }
        Ok(())
    }

    fn settle_purchase(&self, offer: &PriceOffer, mut settlement: Settlement) -> ShopResult<Settlement> {
        self.withdraw(offer.price, &mut settlement)?;

        let unfit = settlement.contents.add_items(&offer.item);
        if unfit != 0 {
            return Err(ShopError::insufficient_storage_space(format!(
                "The shop's container cannot hold the traded items. ({unfit} of {} did not fit)",
                offer.item.data
            )));
        }
        settlement.added.push(offer.item.clone());
        Ok(settlement)
    }

    /// Removes `price` base units of currency, base currency first.
    ///
    /// If high currency has to be broken, the change goes back in as base
    /// currency.
    fn withdraw(&self, price: u32, settlement: &mut Settlement) -> ShopResult<()> {
        let available = self.currencies.value_in(&settlement.contents);
        if available < u64::from(price) {
            return Err(ShopError::insufficient_stock(format!(
                "The shop's container does not contain enough currency. (has {available}, needs {price})"
            )));
        }

        let base = self.currencies.base();
        let base_taken = settlement.contents.count_similar(&base.item).min(price);
        let mut taken = CurrencySplit {
            high: 0,
            base: base_taken,
        };
        let mut change = 0;

        let remaining = price - base_taken;
        if remaining > 0 {
            let Some(high) = self.currencies.high() else {
                // value_in only counts base currency without a high currency
                return Err(ShopError::insufficient_stock(
                    "The shop's container does not contain enough currency.",
                ));
            };
            taken.high = remaining.div_ceil(high.value);
            change = taken.high * high.value - remaining;
        }

        for (denomination, count) in taken.parts() {
            if let Some(currency) = self.currencies.get(denomination) {
                let stack = currency.stack(count);
                if settlement.contents.remove_items(&stack) != 0 {
                    return Err(ShopError::insufficient_stock(format!(
                        "The shop's container does not contain enough {}.",
                        currency.item
                    )));
                }
                settlement.removed.push(stack);
            }
        }

        if change > 0 {
            let unfit = settlement.contents.add_items(&base.stack(change));
            if unfit != 0 {
                return Err(ShopError::insufficient_storage_space(format!(
                    "The shop's container cannot hold the currency change. ({unfit} of {} did not fit)",
                    base.item
                )));
            }
            settlement.added.push(base.stack(change));
        }
        Ok(())
    }
}

/// Whether `offered` pays for `required`.
fn covers(required: &ItemStack, offered: Option<&ItemStack>) -> bool {
    offered.is_some_and(|offered| offered.is_similar(required) && offered.amount >= required.amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemData;
    use crate::recipe::generate_recipes;
    use crate::tax::PercentageTax;

    fn currencies() -> Currencies {
        Currencies::new(ItemData::new("emerald"), 64)
            .with_high(ItemData::new("emerald_block"), 9, 64)
            .unwrap()
            .with_high_currency_min_cost(60)
    }

    fn wheat(amount: u32) -> ItemStack {
        ItemData::new("wheat").stack(amount, 64)
    }

    fn store(amount: u32, price: u32) -> OfferStore {
        OfferStore::from_offers(vec![PriceOffer::new(wheat(amount), price).unwrap()]).unwrap()
    }

    fn recipe(direction: ShopDirection, offers: &OfferStore, c: &Currencies) -> TradingRecipe {
        generate_recipes(direction, offers.offers(), c, |_| false).remove(0)
    }

    #[test]
    fn test_sale_with_taxes() {
        let c = currencies();
        let offers = store(64, 130);
        let tax = PercentageTax::new(10);
        let executor = TradeExecutor::new(ShopDirection::Selling, &offers, &c, &tax);

        let mut container = Container::new(9);
        container.add_items(&wheat(64));

        let trade = Trade::new("alice", recipe(ShopDirection::Selling, &offers, &c));
        let settlement = executor.prepare_trade(&trade, &container).unwrap();

        // 130 - 13 = 117 = 13 blocks
        assert_eq!(settlement.contents.count_similar(&ItemData::new("emerald_block")), 13);
        assert_eq!(settlement.contents.count_similar(&ItemData::new("emerald")), 0);
        assert_eq!(settlement.contents.count_similar(&ItemData::new("wheat")), 0);
        assert_eq!(settlement.removed, vec![wheat(64)]);
    }

    #[test]
    fn test_zero_earnings_is_not_an_error() {
        let c = currencies();
        let offers = store(1, 1);
        let tax = PercentageTax::new(50).with_round_up(true);
        let executor = TradeExecutor::new(ShopDirection::Selling, &offers, &c, &tax);

        let mut container = Container::new(1);
        container.add_items(&wheat(1));

        let trade = Trade::new("alice", recipe(ShopDirection::Selling, &offers, &c));
        let settlement = executor.prepare_trade(&trade, &container).unwrap();
        assert!(settlement.contents.is_empty());
        assert!(settlement.added.is_empty());
    }

    #[test]
    fn test_high_currency_overflow_falls_back_to_base() {
        let c = Currencies::new(ItemData::new("emerald"), 64)
            .with_high(ItemData::new("emerald_block"), 9, 2)
            .unwrap()
            .with_high_currency_min_cost(0);
        let offers = store(1, 27);
        let tax = PercentageTax::NONE;
        let executor = TradeExecutor::new(ShopDirection::Selling, &offers, &c, &tax);

        // Roomy: the freed wheat slot and the empty slot hold all 3 blocks.
        let mut container = Container::new(3);
        container.add_items(&wheat(1));
        container.add_items(&c.base().stack(1));

        let trade = Trade::new("alice", recipe(ShopDirection::Selling, &offers, &c));
        let settlement = executor.prepare_trade(&trade, &container).unwrap();

        assert_eq!(settlement.contents.count_similar(&ItemData::new("emerald_block")), 3);
        assert_eq!(c.value_in(&settlement.contents), 28);

        let mut tight = Container::new(2);
        tight.add_items(&wheat(1));
        tight.add_items(&c.base().stack(1));
        let settlement = executor.prepare_trade(&trade, &tight).unwrap();
        // Only 2 blocks fit into the freed slot, the third block's value is paid in base.
        assert_eq!(settlement.contents.count_similar(&ItemData::new("emerald_block")), 2);
        assert_eq!(settlement.contents.count_similar(&ItemData::new("emerald")), 10);
        assert_eq!(c.value_in(&settlement.contents), 28);
    }

    #[test]
    fn test_amount_drift_is_unexpected() {
        let c = currencies();
        let offers = store(64, 130);
        let tax = PercentageTax::NONE;
        let executor = TradeExecutor::new(ShopDirection::Selling, &offers, &c, &tax);

        let mut stale = recipe(ShopDirection::Selling, &offers, &c);
        stale.result.amount = 32;
        let result = executor.prepare_trade(&Trade::new("alice", stale), &Container::new(9));
        assert!(matches!(result, Err(ShopError::UnexpectedTrade { .. })));
    }

    #[test]
    fn test_offered_items_must_cover_costs() {
        let c = currencies();
        let offers = store(64, 130);
        let tax = PercentageTax::NONE;
        let executor = TradeExecutor::new(ShopDirection::Selling, &offers, &c, &tax);

        let mut container = Container::new(9);
        container.add_items(&wheat(64));

        let mut trade = Trade::new("alice", recipe(ShopDirection::Selling, &offers, &c));
        trade.offered1.amount = 13;
        let result = executor.prepare_trade(&trade, &container);
        assert!(matches!(result, Err(ShopError::UnexpectedTrade { .. })));

        // Both costs must be offered.
        let mut partial = Trade::new("alice", recipe(ShopDirection::Selling, &offers, &c));
        partial.offered2 = None;
        let result = executor.prepare_trade(&partial, &container);
        assert!(matches!(result, Err(ShopError::UnexpectedTrade { .. })));

        // Swapped order is accepted when flagged.
        let mut swapped = Trade::new("alice", recipe(ShopDirection::Selling, &offers, &c));
        let second = swapped.offered2.take().unwrap();
        swapped.offered2 = Some(std::mem::replace(&mut swapped.offered1, second));
        assert!(executor.prepare_trade(&swapped, &container).is_err());
        swapped.item_order_swapped = true;
        assert!(executor.prepare_trade(&swapped, &container).is_ok());
    }

    #[test]
    fn test_out_of_stock_recipe_rejected() {
        let c = currencies();
        let offers = store(64, 130);
        let tax = PercentageTax::NONE;
        let executor = TradeExecutor::new(ShopDirection::Selling, &offers, &c, &tax);

        let mut container = Container::new(9);
        container.add_items(&wheat(64));

        let mut flagged = recipe(ShopDirection::Selling, &offers, &c);
        flagged.out_of_stock = true;
        let result = executor.prepare_trade(&Trade::new("alice", flagged), &container);
        assert!(matches!(result, Err(ShopError::InsufficientStock { .. })));
    }

    #[test]
    fn test_purchase_breaks_high_currency() {
        let c = currencies();
        let offers = store(16, 20);
        let tax = PercentageTax::NONE;
        let executor = TradeExecutor::new(ShopDirection::Buying, &offers, &c, &tax);

        let mut container = Container::new(9);
        container.add_items(&c.base().stack(5));
        container.add_items(&c.high().unwrap().stack(3));

        let trade = Trade::new("bob", recipe(ShopDirection::Buying, &offers, &c));
        let settlement = executor.prepare_trade(&trade, &container).unwrap();

        // 5 base + 2 blocks (18) = 23, change 3.
        assert_eq!(settlement.contents.count_similar(&ItemData::new("emerald")), 3);
        assert_eq!(settlement.contents.count_similar(&ItemData::new("emerald_block")), 1);
        assert_eq!(settlement.contents.count_similar(&ItemData::new("wheat")), 16);
        assert_eq!(c.value_in(&settlement.contents), 12);
    }

    #[test]
    fn test_purchase_without_currency() {
        let c = currencies();
        let offers = store(16, 20);
        let tax = PercentageTax::NONE;
        let executor = TradeExecutor::new(ShopDirection::Buying, &offers, &c, &tax);

        let mut container = Container::new(9);
        container.add_items(&c.base().stack(19));

        let trade = Trade::new("bob", recipe(ShopDirection::Buying, &offers, &c));
        let result = executor.prepare_trade(&trade, &container);
        assert!(matches!(result, Err(ShopError::InsufficientStock { .. })));
    }

    #[test]
    fn test_purchase_without_space() {
        let c = currencies();
        let offers = store(16, 20);
        let tax = PercentageTax::NONE;
        let executor = TradeExecutor::new(ShopDirection::Buying, &offers, &c, &tax);

        // Paying leaves 10 emeralds behind, so no slot frees up for the wheat.
        let mut container = Container::new(2);
        container.add_items(&c.base().stack(30));
        container.add_items(&ItemData::new("dirt").stack(64, 64));

        let trade = Trade::new("bob", recipe(ShopDirection::Buying, &offers, &c));
        let result = executor.prepare_trade(&trade, &container);
        assert!(matches!(result, Err(ShopError::InsufficientStorageSpace { .. })));
    }
}
