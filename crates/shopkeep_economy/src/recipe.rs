//! # Trading Recipes
//!
//! Derives the currently offerable trades from a shop's offers.
//!
//! A recipe is a point-in-time snapshot: it is rebuilt for every listing and
//! never cached, because stock can change between listing and execution.
//!
//! ## Direction
//!
//! ```text
//! Selling shop:  player pays [high] + [base] currency  ->  gets offer item
//! Buying shop:   player pays offer item                ->  gets base currency
//! ```

use crate::currency::Currencies;
use crate::item::ItemStack;
use crate::offers::PriceOffer;

/// Which way a shop trades.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShopDirection {
    /// The shop buys items from players, paying currency.
    Buying,
    /// The shop sells items to players, charging currency.
    Selling,
}

/// One tradeable combination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TradingRecipe {
    /// What the player receives.
    pub result: ItemStack,
    /// First item the player pays.
    pub cost1: ItemStack,
    /// Optional second item the player pays.
    pub cost2: Option<ItemStack>,
    /// Structurally valid, but the shop cannot currently fulfil it.
    pub out_of_stock: bool,
}

impl TradingRecipe {
    /// The recipe's cost items in order.
    pub fn costs(&self) -> impl Iterator<Item = &ItemStack> {
        std::iter::once(&self.cost1).chain(self.cost2.as_ref())
    }
}

impl ShopDirection {
    /// Builds the recipe for an offer.
    ///
    /// Returns `None` if the price cannot be represented by currency stacks.
    #[must_use]
    pub fn create_recipe(
        self,
        offer: &PriceOffer,
        currencies: &Currencies,
        out_of_stock: bool,
    ) -> Option<TradingRecipe> {
        if offer.price == 0 {
            return None;
        }
        match self {
            Self::Selling => {
                let (cost1, cost2) = price_stacks(offer.price, currencies)?;
                Some(TradingRecipe {
                    result: offer.item.clone(),
                    cost1,
                    cost2,
                    out_of_stock,
                })
            }
            Self::Buying => {
                let base = currencies.base();
                if offer.price > base.max_stack {
                    return None;
                }
                Some(TradingRecipe {
                    result: base.stack(offer.price),
                    cost1: offer.item.clone(),
                    cost2: None,
                    out_of_stock,
                })
            }
        }
    }

    /// The non-currency item a recipe trades, used to look up its offer.
    #[must_use]
    pub fn traded_item(self, recipe: &TradingRecipe) -> &ItemStack {
        match self {
            Self::Selling => &recipe.result,
            Self::Buying => &recipe.cost1,
        }
    }
}

/// Splits a price into at most two currency stacks, high currency first.
///
/// The high stack is capped at its max stack size; the rest must fit into a
/// single base stack.
fn price_stacks(price: u32, currencies: &Currencies) -> Option<(ItemStack, Option<ItemStack>)> {
    let split = currencies.decompose(price);
    let mut remaining = price;
    let mut high_stack = None;

    if let Some(high) = currencies.high() {
        let count = split.high.min(high.max_stack);
        if count > 0 {
            remaining -= count * high.value;
            high_stack = Some(high.stack(count));
        }
    }

    let base = currencies.base();
    if remaining > base.max_stack {
        return None;
    }
    let base_stack = (remaining > 0).then(|| base.stack(remaining));

    match (high_stack, base_stack) {
        (Some(high), base) => Some((high, base)),
        (None, Some(base)) => Some((base, None)),
        (None, None) => None,
    }
}

/// Builds recipes for all offers, in offer order.
///
/// `is_out_of_stock` reports whether the shop's container currently lacks
/// what trading the offer would consume. Offers with unrepresentable prices
/// are skipped entirely.
pub fn generate_recipes<F>(
    direction: ShopDirection,
    offers: &[PriceOffer],
    currencies: &Currencies,
    mut is_out_of_stock: F,
) -> Vec<TradingRecipe>
where
    F: FnMut(&PriceOffer) -> bool,
{
    let mut recipes = Vec::with_capacity(offers.len());
    for offer in offers {
        let out_of_stock = is_out_of_stock(offer);
        match direction.create_recipe(offer, currencies, out_of_stock) {
            Some(recipe) => recipes.push(recipe),
            None => tracing::trace!(
                item = %offer.item,
                price = offer.price,
                "price cannot be represented by currency items"
            ),
        }
    }
    recipes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemData;

    fn currencies() -> Currencies {
        Currencies::new(ItemData::new("emerald"), 64)
            .with_high(ItemData::new("emerald_block"), 9, 64)
            .unwrap()
            .with_high_currency_min_cost(60)
    }

    fn offer(kind: &str, amount: u32, price: u32) -> PriceOffer {
        PriceOffer {
            item: ItemData::new(kind).stack(amount, 64),
            price,
        }
    }

    #[test]
    fn test_selling_recipe_uses_both_currencies() {
        let recipe = ShopDirection::Selling
            .create_recipe(&offer("wheat", 64, 130), &currencies(), false)
            .unwrap();
        assert_eq!(recipe.result.amount, 64);
        assert_eq!(recipe.cost1.data.kind, "emerald_block");
        assert_eq!(recipe.cost1.amount, 14);
        assert_eq!(recipe.cost2.as_ref().map(|s| s.amount), Some(4));
    }

    #[test]
    fn test_selling_recipe_below_threshold_is_base_only() {
        let recipe = ShopDirection::Selling
            .create_recipe(&offer("wheat", 1, 60), &currencies(), false)
            .unwrap();
        assert_eq!(recipe.cost1, ItemData::new("emerald").stack(60, 64));
        assert!(recipe.cost2.is_none());
    }

    #[test]
    fn test_selling_recipe_exact_high_multiple() {
        let recipe = ShopDirection::Selling
            .create_recipe(&offer("diamond", 1, 90), &currencies(), false)
            .unwrap();
        assert_eq!(recipe.cost1.amount, 10);
        assert!(recipe.cost2.is_none());
    }

    #[test]
    fn test_costs_in_recipe_order() {
        let c = currencies();
        let split = ShopDirection::Selling
            .create_recipe(&offer("wheat", 64, 130), &c, false)
            .unwrap();
        let kinds: Vec<_> = split.costs().map(|s| s.data.kind.as_str()).collect();
        assert_eq!(kinds, ["emerald_block", "emerald"]);

        let single = ShopDirection::Selling
            .create_recipe(&offer("wheat", 1, 60), &c, false)
            .unwrap();
        assert_eq!(single.costs().count(), 1);
    }

    #[test]
    fn test_unrepresentable_prices_are_omitted() {
        let c = currencies();
        // Zero price.
        assert!(ShopDirection::Selling.create_recipe(&offer("wheat", 1, 0), &c, false).is_none());
        // 64 high stacks (576) plus 100 base does not fit one base stack.
        assert!(ShopDirection::Selling.create_recipe(&offer("beacon", 1, 676), &c, false).is_none());
        // Buying shops pay in a single base stack.
        assert!(ShopDirection::Buying.create_recipe(&offer("wheat", 1, 65), &c, false).is_none());
    }

    #[test]
    fn test_buying_recipe() {
        let recipe = ShopDirection::Buying
            .create_recipe(&offer("wheat", 64, 20), &currencies(), true)
            .unwrap();
        assert_eq!(recipe.cost1.data.kind, "wheat");
        assert_eq!(recipe.result, ItemData::new("emerald").stack(20, 64));
        assert!(recipe.out_of_stock);
        assert_eq!(ShopDirection::Buying.traded_item(&recipe).data.kind, "wheat");
    }

    #[test]
    fn test_generate_follows_offer_order() {
        let offers = vec![offer("wheat", 1, 5), offer("bad", 1, 0), offer("carrot", 1, 7)];
        let recipes = generate_recipes(ShopDirection::Selling, &offers, &currencies(), |o| {
            o.item.data.kind == "carrot"
        });
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].result.data.kind, "wheat");
        assert!(!recipes[0].out_of_stock);
        assert_eq!(recipes[1].result.data.kind, "carrot");
        assert!(recipes[1].out_of_stock);
    }
}
