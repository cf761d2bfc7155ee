//! # Player Shops
//!
//! Ties a shop's offers, trade direction and live container together.
//!
//! ## The Trade Pipeline
//!
//! ```text
//! trade() ──> TradeExecutor::prepare_trade(clone of container)
//!                 │ Err ──> debug log, reject (container untouched)
//!                 ▼
//!             TradeListener::on_trade (may cancel)
//!                 │ cancelled ──> debug log, reject (container untouched)
//!                 ▼
//!             commit new contents ──> TradeListener::on_trade_completed
//! ```

use crate::container::Container;
use crate::currency::Currencies;
use crate::error::{ShopError, ShopResult};
use crate::item::ItemStack;
use crate::offers::OfferStore;
use crate::recipe::{generate_recipes, ShopDirection, TradingRecipe};
use crate::registry::ShopId;
use crate::tax::TaxPolicy;
use crate::trade::{Settlement, Trade, TradeExecutor};

/// Notification about a trade that passed validation.
#[derive(Debug)]
pub struct TradeEvent<'a> {
    /// The shop being traded with.
    pub shop_id: ShopId,
    /// The validated trade.
    pub trade: &'a Trade,
    /// What the trade would do to the container.
    pub settlement: &'a Settlement,
    cancel_reason: Option<String>,
}

impl<'a> TradeEvent<'a> {
    fn new(shop_id: ShopId, trade: &'a Trade, settlement: &'a Settlement) -> Self {
        Self {
            shop_id,
            trade,
            settlement,
            cancel_reason: None,
        }
    }

    /// The trading player.
    #[must_use]
    pub fn player(&self) -> &str {
        &self.trade.player
    }

    /// The chosen recipe.
    #[must_use]
    pub fn recipe(&self) -> &TradingRecipe {
        &self.trade.recipe
    }

    /// Vetoes the trade.
    pub fn cancel(&mut self, reason: impl Into<String>) {
        self.cancel_reason = Some(reason.into());
    }

    /// Returns true if a listener vetoed the trade.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_reason.is_some()
    }
}

/// Observer of executed trades.
pub trait TradeListener {
    /// Called before a validated trade is committed. May cancel it.
    fn on_trade(&self, event: &mut TradeEvent<'_>);

    /// Called after the trade was committed to the container.
    fn on_trade_completed(&self, _shop_id: ShopId, _trade: &Trade, _settlement: &Settlement) {}
}

/// A player-owned shop.
#[derive(Clone, Debug)]
pub struct PlayerShop {
    id: ShopId,
    owner: String,
    direction: ShopDirection,
    offers: OfferStore,
    container: Container,
}

impl PlayerShop {
    /// Creates a shop with no offers.
    #[must_use]
    pub fn new(
        id: ShopId,
        owner: impl Into<String>,
        direction: ShopDirection,
        container: Container,
    ) -> Self {
        Self {
            id,
            owner: owner.into(),
            direction,
            offers: OfferStore::new(),
            container,
        }
    }

    /// Replaces the offer store (e.g. with offers loaded from disk).
    #[must_use]
    pub fn with_offers(mut self, offers: OfferStore) -> Self {
        self.offers = offers;
        self
    }

    /// The shop id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ShopId {
        self.id
    }

    /// The owning player.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Which way the shop trades.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> ShopDirection {
        self.direction
    }

    /// The shop's offers.
    #[must_use]
    pub fn offers(&self) -> &OfferStore {
        &self.offers
    }

    /// Mutable access to the shop's offers.
    pub fn offers_mut(&mut self) -> &mut OfferStore {
        &mut self.offers
    }

    /// The live container.
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Mutable access to the live container (owner restocking, hoppers).
    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    /// Returns true if trading `item` would exceed what the container holds.
    fn lacks(&self, item: &ItemStack) -> bool {
        self.container.count_similar(&item.data) < item.amount
    }

    /// The recipes currently on offer, with stock read from the container.
    #[must_use]
    pub fn trading_recipes(&self, currencies: &Currencies) -> Vec<TradingRecipe> {
        match self.direction {
            ShopDirection::Selling => {
                generate_recipes(self.direction, self.offers.offers(), currencies, |offer| {
                    self.lacks(&offer.item)
                })
            }
            ShopDirection::Buying => {
                let funds = currencies.value_in(&self.container);
                generate_recipes(self.direction, self.offers.offers(), currencies, |offer| {
                    funds < u64::from(offer.price)
                })
            }
        }
    }

    /// Executes a trade against the live container.
    ///
    /// The container is replaced only if the trade succeeds and no listener
    /// cancels it.
    ///
    /// # Errors
    ///
    /// Any trade rejection from [`TradeExecutor::prepare_trade`], or
    /// `TradeCancelled` if a listener vetoed the trade.
    pub fn trade(
        &mut self,
        trade: &Trade,
        currencies: &Currencies,
        tax: &dyn TaxPolicy,
        listeners: &[&dyn TradeListener],
    ) -> ShopResult<Settlement> {
        let executor = TradeExecutor::new(self.direction, &self.offers, currencies, tax);
        let settlement = match executor.prepare_trade(trade, &self.container) {
            Ok(settlement) => settlement,
            Err(e) => return Err(self.prevented(trade, e)),
        };

        let mut event = TradeEvent::new(self.id, trade, &settlement);
        for listener in listeners {
            listener.on_trade(&mut event);
        }
        if let Some(reason) = event.cancel_reason.take() {
            return Err(self.prevented(trade, ShopError::TradeCancelled { reason }));
        }

        self.container = settlement.contents.clone();
        tracing::debug!(
            shop = self.id,
            player = %trade.player,
            result = %trade.recipe.result,
            "trade executed"
        );
        for listener in listeners {
            listener.on_trade_completed(self.id, trade, &settlement);
        }
        Ok(settlement)
    }

    /// Logs a prevented trade to the debug channel and passes the error on.
    fn prevented(&self, trade: &Trade, error: ShopError) -> ShopError {
        tracing::debug!(
            shop = self.id,
            player = %trade.player,
            player_message = error.message().as_str(),
            reason = %error,
            "prevented trade"
        );
        error
    }
}
