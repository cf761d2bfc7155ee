//! # Economy Settings
//!
//! Currency, tax and container settings, loaded once from TOML.
//!
//! ```toml
//! container_size = 27
//!
//! [currency]
//! high_currency_min_cost = 60
//!
//! [currency.base]
//! item = "emerald"
//!
//! [currency.high]
//! item = "emerald_block"
//! value = 9
//!
//! [tax]
//! rate = 10
//! round_up = false
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::container::DEFAULT_CONTAINER_SIZE;
use crate::currency::{Currencies, DEFAULT_HIGH_CURRENCY_MIN_COST, DEFAULT_HIGH_CURRENCY_VALUE};
use crate::error::{ShopError, ShopResult};
use crate::item::{ItemData, DEFAULT_MAX_STACK};
use crate::tax::PercentageTax;

/// One currency item as written in the settings file.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurrencyItemConfig {
    /// Item kind.
    pub item: String,
    /// Significant metadata.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
    /// Worth in base units. Must be omitted or 1 for the base currency.
    pub value: Option<u32>,
    /// Max stack size.
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
}

impl CurrencyItemConfig {
    fn named(item: &str, value: Option<u32>) -> Self {
        Self {
            item: item.to_owned(),
            meta: BTreeMap::new(),
            value,
            max_stack: DEFAULT_MAX_STACK,
        }
    }

    fn item_data(&self) -> ItemData {
        ItemData {
            kind: self.item.clone(),
            meta: self.meta.clone(),
        }
    }
}

/// The `[currency]` section.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurrencyConfig {
    /// The value-1 currency.
    pub base: CurrencyItemConfig,
    /// The optional high currency.
    pub high: Option<CurrencyItemConfig>,
    /// Prices at or below this never use the high currency.
    #[serde(default = "default_high_currency_min_cost")]
    pub high_currency_min_cost: u32,
}

impl Default for CurrencyConfig {
    /// Same currencies as [`Currencies::default`].
    fn default() -> Self {
        Self {
            base: CurrencyItemConfig::named("emerald", None),
            high: Some(CurrencyItemConfig::named(
                "emerald_block",
                Some(DEFAULT_HIGH_CURRENCY_VALUE),
            )),
            high_currency_min_cost: DEFAULT_HIGH_CURRENCY_MIN_COST,
        }
    }
}

/// All economy settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EconomySettings {
    /// Slots in a newly created shop container.
    #[serde(default = "default_container_size")]
    pub container_size: usize,
    /// Currency configuration.
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Tax applied to the earnings of selling shops.
    #[serde(default)]
    pub tax: PercentageTax,
}

const fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

const fn default_high_currency_min_cost() -> u32 {
    DEFAULT_HIGH_CURRENCY_MIN_COST
}

const fn default_container_size() -> usize {
    DEFAULT_CONTAINER_SIZE
}

impl EconomySettings {
    /// Parses and validates settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on parse or validation failure.
    pub fn from_toml_str(contents: &str) -> ShopResult<Self> {
        let settings: Self = toml::from_str(contents)
            .map_err(|e| ShopError::InvalidConfig(format!("failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> ShopResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ShopError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        let settings = Self::from_toml_str(&contents)?;
        tracing::info!(
            path = %path.display(),
            high_currency = settings.currency.high.is_some(),
            tax_rate = settings.tax.rate,
            "loaded economy settings"
        );
        Ok(settings)
    }

    /// Checks value ranges the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> ShopResult<()> {
        if self.container_size == 0 {
            return Err(ShopError::InvalidConfig("container_size must be positive".into()));
        }
        if self.tax.rate > 100 {
            return Err(ShopError::InvalidConfig(format!(
                "tax rate must be between 0 and 100, got {}",
                self.tax.rate
            )));
        }
        let base = &self.currency.base;
        if base.item.trim().is_empty() {
            return Err(ShopError::InvalidConfig("base currency item is empty".into()));
        }
        if base.value.is_some_and(|v| v != 1) {
            return Err(ShopError::InvalidConfig("base currency value must be 1".into()));
        }
        if base.max_stack == 0 {
            return Err(ShopError::InvalidConfig("base currency max_stack must be positive".into()));
        }
        if let Some(high) = &self.currency.high {
            match high.value {
                None => {
                    return Err(ShopError::InvalidConfig("high currency needs a value".into()));
                }
                Some(value) if value <= 1 => {
                    return Err(ShopError::InvalidConfig(format!(
                        "high currency value must be greater than 1, got {value}"
                    )));
                }
                Some(_) => {}
            }
            if high.item_data() == base.item_data() {
                return Err(ShopError::InvalidConfig(format!(
                    "high currency item '{}' is the same as the base currency item",
                    high.item
                )));
            }
            if high.max_stack == 0 {
                return Err(ShopError::InvalidConfig(
                    "high currency max_stack must be positive".into(),
                ));
            }
            if self.currency.high_currency_min_cost == 0 {
                tracing::warn!("high_currency_min_cost is 0, every price above 0 uses the high currency");
            }
        }
        Ok(())
    }

    /// Builds the currency system.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the high currency is invalid.
    pub fn currencies(&self) -> ShopResult<Currencies> {
        let base = &self.currency.base;
        let mut currencies = Currencies::new(base.item_data(), base.max_stack)
            .with_high_currency_min_cost(self.currency.high_currency_min_cost);
        if let Some(high) = &self.currency.high {
            currencies = currencies.with_high(high.item_data(), high.value.unwrap_or(0), high.max_stack)?;
        }
        Ok(currencies)
    }
}
