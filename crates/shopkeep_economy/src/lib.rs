//! # Shopkeep Economy
//!
//! The shop offer and trade-settlement engine.
//!
//! ## Design Principles
//!
//! 1. **All-or-nothing trades** - the executor works on a scratch copy of the
//!    container; a rejected trade leaves the real container untouched
//! 2. **Integer currency** - two-tier (base + high) greedy decomposition
//! 3. **One offer per item** - the offer store replaces, never duplicates
//! 4. **External configuration** - currencies and taxes come from TOML
//!
//! ## Threading
//!
//! Everything here is synchronous. A shop is owned by one logical thread at a
//! time; [`ShopRegistry`] serializes access per shop when several threads
//! serve shops in parallel.
//!
//! ## Example
//!
//! ```rust
//! use shopkeep_economy::{
//!     Container, Currencies, ItemData, OfferStore, PercentageTax, PlayerShop, PriceOffer,
//!     ShopDirection, Trade,
//! };
//!
//! let currencies = Currencies::default();
//! let wheat = ItemData::new("wheat");
//!
//! let mut container = Container::new(27);
//! container.add_items(&wheat.stack(64, 64));
//!
//! let offers = OfferStore::from_offers(vec![PriceOffer::new(wheat.stack(64, 64), 130)?])?;
//! let mut shop = PlayerShop::new(1, "owner", ShopDirection::Selling, container).with_offers(offers);
//!
//! let recipe = shop.trading_recipes(&currencies).remove(0);
//! let trade = Trade::new("alice", recipe);
//! shop.trade(&trade, &currencies, &PercentageTax::NONE, &[])?;
//!
//! assert_eq!(currencies.value_in(shop.container()), 130);
//! # Ok::<(), shopkeep_economy::ShopError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod container;
pub mod currency;
pub mod error;
pub mod item;
pub mod offers;
pub mod recipe;
pub mod registry;
pub mod settings;
pub mod shop;
pub mod tax;
pub mod trade;

pub use container::{Container, DEFAULT_CONTAINER_SIZE};
pub use currency::{
    Currencies, Currency, CurrencySplit, Denomination, DEFAULT_HIGH_CURRENCY_MIN_COST,
    DEFAULT_HIGH_CURRENCY_VALUE,
};
pub use error::{MessageKey, ShopError, ShopResult};
pub use item::{ItemData, ItemStack, DEFAULT_MAX_STACK};
pub use offers::{Change, OfferStore, PriceOffer};
pub use recipe::{generate_recipes, ShopDirection, TradingRecipe};
pub use registry::{SharedShop, ShopId, ShopRegistry};
pub use settings::EconomySettings;
pub use shop::{PlayerShop, TradeEvent, TradeListener};
pub use tax::{PercentageTax, TaxPolicy};
pub use trade::{Settlement, Trade, TradeExecutor};
