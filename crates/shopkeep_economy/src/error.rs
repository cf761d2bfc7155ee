//! # Shop Error Types
//!
//! All errors that can occur in the offer store and the trade executor.
//!
//! Every error carries an internal reason for the debug channel. Trade
//! rejections additionally map to exactly one player-facing [`MessageKey`],
//! so the player only ever sees a generic category and never the internals
//! of someone else's shop.

use thiserror::Error;

use crate::registry::ShopId;

/// Errors that can occur in the shop economy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    /// Malformed input to an offer store mutator. Rejected before any change.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The recipe presented for execution no longer matches a current offer.
    #[error("unexpected trade: {reason}")]
    UnexpectedTrade {
        /// Internal cause.
        reason: String,
    },

    /// The container lacks the items or currency the trade would consume.
    #[error("insufficient stock: {reason}")]
    InsufficientStock {
        /// Internal cause.
        reason: String,
    },

    /// The container cannot hold what the trade would add to it.
    #[error("insufficient storage space: {reason}")]
    InsufficientStorageSpace {
        /// Internal cause.
        reason: String,
    },

    /// A trade listener vetoed the trade.
    #[error("trade cancelled: {reason}")]
    TradeCancelled {
        /// Internal cause.
        reason: String,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No shop is registered under this id.
    #[error("unknown shop: {0}")]
    UnknownShop(ShopId),
}

impl ShopError {
    /// Creates an `UnexpectedTrade` rejection.
    pub(crate) fn unexpected_trade(reason: impl Into<String>) -> Self {
        Self::UnexpectedTrade { reason: reason.into() }
    }

    /// Creates an `InsufficientStock` rejection.
    pub(crate) fn insufficient_stock(reason: impl Into<String>) -> Self {
        Self::InsufficientStock { reason: reason.into() }
    }

    /// Creates an `InsufficientStorageSpace` rejection.
    pub(crate) fn insufficient_storage_space(reason: impl Into<String>) -> Self {
        Self::InsufficientStorageSpace { reason: reason.into() }
    }

    /// The player-facing message category for this error.
    #[must_use]
    pub const fn message(&self) -> MessageKey {
        match self {
            Self::UnexpectedTrade { .. } => MessageKey::CannotTradeUnexpectedTrade,
            Self::InsufficientStock { .. } => MessageKey::CannotTradeInsufficientStock,
            Self::InsufficientStorageSpace { .. } => {
                MessageKey::CannotTradeInsufficientStorageSpace
            }
            Self::TradeCancelled { .. } => MessageKey::CannotTradeCancelled,
            Self::InvalidArgument(_) | Self::InvalidConfig(_) | Self::UnknownShop(_) => {
                MessageKey::InvalidInput
            }
        }
    }

    /// Returns true if this error is a rejected trade (as opposed to bad input).
    #[must_use]
    pub const fn is_trade_rejection(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedTrade { .. }
                | Self::InsufficientStock { .. }
                | Self::InsufficientStorageSpace { .. }
                | Self::TradeCancelled { .. }
        )
    }
}

/// Symbolic player-facing message keys.
///
/// The host resolves these against its language files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// The trade no longer matches the shop's offers.
    CannotTradeUnexpectedTrade,
    /// The shop is out of stock.
    CannotTradeInsufficientStock,
    /// The shop's container is full.
    CannotTradeInsufficientStorageSpace,
    /// The trade was cancelled.
    CannotTradeCancelled,
    /// Generic invalid input.
    InvalidInput,
}

impl MessageKey {
    /// The message key as used in language files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CannotTradeUnexpectedTrade => "cannot-trade-unexpected-trade",
            Self::CannotTradeInsufficientStock => "cannot-trade-insufficient-stock",
            Self::CannotTradeInsufficientStorageSpace => "cannot-trade-insufficient-storage-space",
            Self::CannotTradeCancelled => "cannot-trade-cancelled",
            Self::InvalidInput => "invalid-input",
        }
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for shop operations.
pub type ShopResult<T> = Result<T, ShopError>;
