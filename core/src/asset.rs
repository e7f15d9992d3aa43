//! Assets and deal sides, and the textual asset spec they are parsed from.
//!
//! A side is written as `<QU>:<asset>:<asset>...` where every asset is
//! `<name>,<issuer-identity>,<amount>`. A string without any `:` is a bare
//! QU amount.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "json")]
use serde::Serialize;

use crate::bounded::Bounded;
use crate::error::AssetError;
use crate::identity::PublicKey;
use crate::{EscrowError, Result};

/// Maximum number of assets carried by one side of a deal.
pub const MAX_ASSETS_PER_SIDE: usize = 4;

/// Size of an asset symbol on the wire.
pub const ASSET_NAME_LEN: usize = 8;

/// Eight-byte asset symbol, zero padded. Not necessarily valid text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AssetName([u8; ASSET_NAME_LEN]);

impl AssetName {
    /// Truncate or zero-pad `text` to eight bytes.
    pub fn new(text: &str) -> Self {
        let mut bytes = [0u8; ASSET_NAME_LEN];
        let n = text.len().min(ASSET_NAME_LEN);
        bytes[..n].copy_from_slice(&text.as_bytes()[..n]);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; ASSET_NAME_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ASSET_NAME_LEN] {
        &self.0
    }

    /// Printable form with trailing zero bytes stripped.
    pub fn to_text(&self) -> String {
        let end = self
            .0
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.to_text())
    }
}

impl fmt::Debug for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetName({:?})", self.to_text())
    }
}

#[cfg(feature = "json")]
impl Serialize for AssetName {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_text())
    }
}

/// A quantity of a named asset from a specific issuer.
#[cfg_attr(feature = "json", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AssetAmount {
    issuer: PublicKey,
    name: AssetName,
    amount: i64,
}

impl AssetAmount {
    pub fn new(issuer: PublicKey, name: AssetName, amount: i64) -> Self {
        Self {
            issuer,
            name,
            amount,
        }
    }

    pub fn issuer(&self) -> &PublicKey {
        &self.issuer
    }

    pub fn name(&self) -> &AssetName {
        &self.name
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }
}

impl FromStr for AssetAmount {
    type Err = EscrowError;

    /// Parse one `<name>,<issuer-identity>,<amount>` group.
    /// Parts past the third are ignored.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(',');
        let (Some(name), Some(issuer), Some(amount)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AssetError::BadRequest(s.to_string()).into());
        };

        let name = AssetName::new(name);
        let issuer = PublicKey::from_identity(issuer.trim())?;
        let amount = parse_amount(amount)?;

        Ok(Self::new(issuer, name, amount))
    }
}

/// One side of a deal: up to four assets plus a QU amount.
#[cfg_attr(feature = "json", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DealSide {
    assets: Bounded<AssetAmount, MAX_ASSETS_PER_SIDE>,
    qu: i64,
}

impl DealSide {
    /// A side carrying only QU.
    pub fn new(qu: i64) -> Self {
        Self {
            assets: Bounded::new(),
            qu,
        }
    }

    pub(crate) fn from_parts(assets: Bounded<AssetAmount, MAX_ASSETS_PER_SIDE>, qu: i64) -> Self {
        Self { assets, qu }
    }

    /// Add an asset; returns `false` once the side is full.
    pub fn push_asset(&mut self, asset: AssetAmount) -> bool {
        self.assets.push(asset).is_ok()
    }

    pub fn qu(&self) -> i64 {
        self.qu
    }

    pub fn assets(&self) -> &[AssetAmount] {
        self.assets.as_slice()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub(crate) fn bounded_assets(&self) -> &Bounded<AssetAmount, MAX_ASSETS_PER_SIDE> {
        &self.assets
    }

    /// Parse a side from its asset spec.
    ///
    /// Groups beyond [`MAX_ASSETS_PER_SIDE`] are dropped and a single trailing
    /// `:` is ignored. Any malformed
    /// group aborts the whole parse, so no partially-filled side escapes.
    ///
    /// # Examples
    ///
    /// ```
    /// use escrow_core::asset::DealSide;
    ///
    /// let side: DealSide = "250".parse().unwrap();
    /// assert_eq!(side.qu(), 250);
    /// assert_eq!(side.asset_count(), 0);
    /// ```
    pub fn parse(spec: &str) -> Result<Self> {
        let Some((qu, groups)) = spec.split_once(':') else {
            return Ok(Self::new(parse_amount(spec)?));
        };

        let mut side = Self::new(parse_amount(qu)?);
        // a single trailing ':' closes the list rather than opening a group
        let groups = groups.strip_suffix(':').unwrap_or(groups);
        if groups.is_empty() {
            return Ok(side);
        }
        for group in groups.split(':').take(MAX_ASSETS_PER_SIDE) {
            let asset = group.parse::<AssetAmount>()?;
            side.push_asset(asset);
        }
        Ok(side)
    }
}

impl FromStr for DealSide {
    type Err = EscrowError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DealSide {
    /// Renders the side back into its asset spec.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qu)?;
        for asset in self.assets() {
            write!(f, ":{},{},{}", asset.name, asset.issuer, asset.amount)?;
        }
        Ok(())
    }
}

fn parse_amount(text: &str) -> Result<i64> {
    Ok(text.trim().parse::<i64>()?)
}
