//! # Offer Store
//!
//! Per-shop collection of price offers.
//!
//! ## Invariants
//!
//! 1. At most one offer per item: adding an offer for an item that is
//!    already offered replaces the old offer.
//! 2. Insertion order is preserved; recipes are listed in this order.
//! 3. List mutators validate every element before applying any of them.
//!
//! Every mutator reports a [`Change`] and raises the store's dirty flag, which
//! the persistence layer clears with [`OfferStore::take_dirty`] after saving.

use serde::{Deserialize, Serialize};

use crate::error::{ShopError, ShopResult};
use crate::item::{ItemData, ItemStack};

/// "This shop trades `item.amount` of `item` for `price` base currency units."
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOffer {
    /// The traded item; its amount is the traded quantity.
    pub item: ItemStack,
    /// Price in base currency units.
    pub price: u32,
}

impl PriceOffer {
    /// Creates a validated offer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the item is empty or the price is zero.
    pub fn new(item: ItemStack, price: u32) -> ShopResult<Self> {
        let offer = Self { item, price };
        offer.validate()?;
        Ok(offer)
    }

    /// The traded item.
    #[inline]
    #[must_use]
    pub fn item(&self) -> &ItemStack {
        &self.item
    }

    /// The traded quantity.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> u32 {
        self.item.amount
    }

    /// The price in base currency units.
    #[inline]
    #[must_use]
    pub fn price(&self) -> u32 {
        self.price
    }

    /// Checks that the offer describes an actual trade.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` describing the first problem found.
    pub fn validate(&self) -> ShopResult<()> {
        if self.item.data.is_blank() {
            return Err(ShopError::InvalidArgument("offer item is empty".to_string()));
        }
        if self.item.amount == 0 {
            return Err(ShopError::InvalidArgument(format!(
                "offer amount for '{}' must be positive",
                self.item.data
            )));
        }
        if self.item.max_stack == 0 {
            return Err(ShopError::InvalidArgument(format!(
                "offer max stack size for '{}' must be positive",
                self.item.data
            )));
        }
        if self.price == 0 {
            return Err(ShopError::InvalidArgument(format!(
                "offer price for '{}' must be positive",
                self.item.data
            )));
        }
        Ok(())
    }
}

/// Whether a mutation changed the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    /// The store was modified.
    Changed,
    /// Nothing happened.
    Unchanged,
}

impl Change {
    /// Returns true for [`Change::Changed`].
    #[inline]
    #[must_use]
    pub const fn is_changed(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Insertion-ordered offers, one per item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OfferStore {
    offers: Vec<PriceOffer>,
    dirty: bool,
}

impl OfferStore {
    /// Creates an empty, clean store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clean store from loaded offers.
    ///
    /// Later offers for the same item replace earlier ones.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if any offer is invalid.
    pub fn from_offers(offers: Vec<PriceOffer>) -> ShopResult<Self> {
        let mut store = Self::new();
        store.set_offers(offers)?;
        store.dirty = false;
        Ok(store)
    }

    /// All offers in insertion order.
    #[inline]
    #[must_use]
    pub fn offers(&self) -> &[PriceOffer] {
        &self.offers
    }

    /// Number of offers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.offers.len()
    }

    /// Returns true if there are no offers.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    /// Finds the offer for an item similar to `item`.
    #[must_use]
    pub fn get_offer(&self, item: &ItemData) -> Option<&PriceOffer> {
        self.offers.iter().find(|offer| offer.item.is_of(item))
    }

    /// Adds an offer, replacing any offer for the same item.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the offer is invalid; nothing changes.
    pub fn add_offer(&mut self, offer: PriceOffer) -> ShopResult<Change> {
        offer.validate()?;
        self.insert(offer);
        self.dirty = true;
        Ok(Change::Changed)
    }

    /// Adds offers in order; later entries for the same item win.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if any offer is invalid; nothing changes.
    pub fn add_offers(&mut self, offers: Vec<PriceOffer>) -> ShopResult<Change> {
        validate_all(&offers)?;
        for offer in offers {
            self.insert(offer);
        }
        self.dirty = true;
        Ok(Change::Changed)
    }

    /// Removes the offer for `item`, if any.
    ///
    /// Removing an absent item is a no-op and leaves the dirty flag alone.
    pub fn remove_offer(&mut self, item: &ItemData) -> Change {
        match self.offers.iter().position(|offer| offer.item.is_of(item)) {
            Some(index) => {
                self.offers.remove(index);
                self.dirty = true;
                tracing::trace!(item = %item, "removed offer");
                Change::Changed
            }
            None => Change::Unchanged,
        }
    }

    /// Replaces all offers.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if any offer is invalid; nothing changes.
    pub fn set_offers(&mut self, offers: Vec<PriceOffer>) -> ShopResult<Change> {
        validate_all(&offers)?;
        self.offers.clear();
        for offer in offers {
            self.insert(offer);
        }
        self.dirty = true;
        Ok(Change::Changed)
    }

    /// Removes all offers.
    pub fn clear_offers(&mut self) -> Change {
        self.offers.clear();
        self.dirty = true;
        Change::Changed
    }

    /// Returns true if the store changed since the last save.
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag, returning its previous value.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn insert(&mut self, offer: PriceOffer) {
        if let Some(index) = self.offers.iter().position(|o| o.item.is_similar(&offer.item)) {
            self.offers.remove(index);
        }
        tracing::trace!(item = %offer.item, price = offer.price, "added offer");
        self.offers.push(offer);
    }
}

fn validate_all(offers: &[PriceOffer]) -> ShopResult<()> {
    for (index, offer) in offers.iter().enumerate() {
        offer.validate().map_err(|e| match e {
            ShopError::InvalidArgument(reason) => {
                ShopError::InvalidArgument(format!("offer #{index}: {reason}"))
            }
            other => other,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(kind: &str, amount: u32, price: u32) -> PriceOffer {
        PriceOffer::new(ItemData::new(kind).stack(amount, 64), price).unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let mut store = OfferStore::new();
        assert!(store.add_offer(offer("wheat", 64, 130)).unwrap().is_changed());
        assert!(store.is_dirty());

        let found = store.get_offer(&ItemData::new("wheat")).unwrap();
        assert_eq!(found.price(), 130);
        assert_eq!(found.amount(), 64);
        assert!(store.get_offer(&ItemData::new("carrot")).is_none());
    }

    #[test]
    fn test_add_replaces_existing_offer() {
        let mut store = OfferStore::new();
        store.add_offer(offer("wheat", 64, 130)).unwrap();
        store.add_offer(offer("carrot", 16, 10)).unwrap();
        store.add_offer(offer("wheat", 32, 70)).unwrap();

        assert_eq!(store.len(), 2);
        let wheat = store.get_offer(&ItemData::new("wheat")).unwrap();
        assert_eq!((wheat.amount(), wheat.price()), (32, 70));
        // Replaced offers move to the end.
        assert_eq!(store.offers()[0].item.data.kind, "carrot");
    }

    #[test]
    fn test_add_offers_later_entries_win() {
        let mut store = OfferStore::new();
        store
            .add_offers(vec![offer("wheat", 1, 1), offer("carrot", 1, 2), offer("wheat", 1, 3)])
            .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_offer(&ItemData::new("wheat")).unwrap().price(), 3);
    }

    #[test]
    fn test_list_validation_is_all_or_nothing() {
        let mut store = OfferStore::from_offers(vec![offer("wheat", 64, 130)]).unwrap();
        assert!(!store.is_dirty());
        let before = store.clone();

        let mut broken = offer("carrot", 1, 1);
        broken.item.amount = 0;
        let result = store.add_offers(vec![offer("potato", 1, 1), broken.clone()]);
        assert!(matches!(result, Err(ShopError::InvalidArgument(_))));
        assert_eq!(store, before);

        assert!(store.set_offers(vec![broken.clone()]).is_err());
        assert!(store.add_offer(broken).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn test_invalid_offers_rejected() {
        assert!(PriceOffer::new(ItemData::new("").stack(1, 64), 5).is_err());
        assert!(PriceOffer::new(ItemData::new("wheat").stack(0, 64), 5).is_err());
        assert!(PriceOffer::new(ItemData::new("wheat").stack(1, 64), 0).is_err());
    }

    #[test]
    fn test_decoded_zero_max_stack_rejected() {
        let decoded: PriceOffer = toml::from_str(
            "price = 5\n[item]\namount = 1\nmax_stack = 0\n[item.data]\nkind = \"wheat\"\n",
        )
        .unwrap();
        assert_eq!(decoded.item.max_stack, 0);
        assert!(matches!(decoded.validate(), Err(ShopError::InvalidArgument(_))));

        let mut store = OfferStore::new();
        assert!(store.add_offer(decoded).is_err());
        assert!(store.is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = OfferStore::from_offers(vec![offer("wheat", 64, 130)]).unwrap();
        assert_eq!(store.remove_offer(&ItemData::new("carrot")), Change::Unchanged);
        assert!(!store.is_dirty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_twice() {
        let mut store = OfferStore::from_offers(vec![offer("wheat", 64, 130)]).unwrap();

        assert_eq!(store.remove_offer(&ItemData::new("wheat")), Change::Changed);
        assert!(store.take_dirty());

        assert_eq!(store.remove_offer(&ItemData::new("wheat")), Change::Unchanged);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_set_and_clear_always_dirty() {
        let mut store = OfferStore::new();
        assert!(store.set_offers(Vec::new()).unwrap().is_changed());
        assert!(store.take_dirty());
        assert!(store.clear_offers().is_changed());
        assert!(store.is_dirty());
    }

    #[test]
    fn test_insertion_order() {
        let store = OfferStore::from_offers(vec![
            offer("wheat", 1, 1),
            offer("carrot", 1, 1),
            offer("potato", 1, 1),
        ])
        .unwrap();
        let kinds: Vec<_> = store.offers().iter().map(|o| o.item.data.kind.as_str()).collect();
        assert_eq!(kinds, ["wheat", "carrot", "potato"]);
    }
}
