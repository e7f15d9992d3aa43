use std::fmt;

#[cfg(feature = "json")]
use serde::Serialize;

use crate::asset::DealSide;
use crate::bounded::Bounded;
use crate::identity::PublicKey;

/// Slots in the owned-deals list of a listing response.
pub const OWNED_DEALS_CAPACITY: usize = 8;
/// Slots in the proposed-deals list of a listing response.
pub const PROPOSED_DEALS_CAPACITY: usize = 8;
/// Slots in the opened-deals list of a listing response.
pub const OPENED_DEALS_CAPACITY: usize = 32;

/// A proposed exchange: the creator gives `offered` for `requested`.
#[cfg_attr(feature = "json", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deal {
    /// Designated acceptor. Zero for deals anyone may take.
    pub acceptor: PublicKey,
    pub offered: DealSide,
    pub requested: DealSide,
}

impl Deal {
    /// Table rows needed to show both sides; never less than one.
    pub fn row_count(&self) -> usize {
        self.offered
            .asset_count()
            .max(self.requested.asset_count())
            .max(1)
    }
}

/// A deal together with its contract-assigned index.
#[cfg_attr(feature = "json", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DealEntity {
    pub index: i64,
    pub deal: Deal,
}

/// Which list of a [`DealListing`] a deal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DealList {
    /// Created by the queried owner.
    Owned,
    /// Naming the queried owner as acceptor.
    Proposed,
    /// Open to any acceptor.
    Opened,
}

impl DealList {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Owned => "OWNED DEALS",
            Self::Proposed => "PROPOSED DEALS",
            Self::Opened => "OPENED DEALS",
        }
    }
}

impl fmt::Display for DealList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Owned => "owned",
            Self::Proposed => "proposed",
            Self::Opened => "opened",
        })
    }
}

/// Decoded answer to a deal query for one owner.
#[cfg_attr(feature = "json", derive(Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DealListing {
    /// Total deals ever created by the contract.
    pub counter: i64,
    pub owned: Bounded<DealEntity, OWNED_DEALS_CAPACITY>,
    pub proposed: Bounded<DealEntity, PROPOSED_DEALS_CAPACITY>,
    pub opened: Bounded<DealEntity, OPENED_DEALS_CAPACITY>,
}

impl DealListing {
    pub fn list(&self, which: DealList) -> &[DealEntity] {
        match which {
            DealList::Owned => self.owned.as_slice(),
            DealList::Proposed => self.proposed.as_slice(),
            DealList::Opened => self.opened.as_slice(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty() && self.proposed.is_empty() && self.opened.is_empty()
    }

    /// Find a deal the owner may accept: proposed to them, or opened to all.
    pub fn find_acceptable(&self, index: i64) -> Option<&DealEntity> {
        self.proposed
            .iter()
            .chain(self.opened.iter())
            .find(|entity| entity.index == index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(index: i64) -> DealEntity {
        DealEntity {
            index,
            deal: Deal::default(),
        }
    }

    #[test]
    fn acceptable_deals_exclude_owned() {
        let mut listing = DealListing::default();
        listing.owned.push(entity(1)).unwrap();
        listing.proposed.push(entity(2)).unwrap();
        listing.opened.push(entity(3)).unwrap();

        assert!(listing.find_acceptable(1).is_none());
        assert_eq!(listing.find_acceptable(2).map(|e| e.index), Some(2));
        assert_eq!(listing.find_acceptable(3).map(|e| e.index), Some(3));
        assert!(!listing.is_empty());
    }

    #[test]
    fn empty_deal_still_takes_a_row() {
        assert_eq!(Deal::default().row_count(), 1);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_lists_only_valid_entries() {
        let mut listing = DealListing {
            counter: 4,
            ..Default::default()
        };
        listing.opened.push(entity(9)).unwrap();

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["counter"], 4);
        assert_eq!(json["owned"].as_array().unwrap().len(), 0);
        assert_eq!(json["opened"].as_array().unwrap().len(), 1);
        assert_eq!(json["opened"][0]["index"], 9);
        assert_eq!(
            json["opened"][0]["deal"]["acceptor"],
            PublicKey::ZERO.to_identity()
        );
    }
}
