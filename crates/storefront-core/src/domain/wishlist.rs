//! Wishlist ownership and membership.

use crate::{GuestId, ProductId, StorefrontError, StorefrontResult, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Default maximum number of products on one wishlist.
pub const DEFAULT_MAX_WISHLIST_ITEMS: usize = 25;

/// Whether a wishlist belongs to an anonymous session or an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Guest,
    User,
}

impl OwnerKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::User => "user",
        }
    }
}

impl fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The guest session or authenticated account a wishlist belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    Guest(GuestId),
    User(UserId),
}

impl Owner {
    /// Resolves the owner of a request.
    ///
    /// An authenticated account always wins over the session cookie; a request
    /// carrying neither is rejected with [`StorefrontError::InvalidOwner`].
    pub fn resolve(session: Option<&str>, user: Option<UserId>) -> StorefrontResult<Self> {
        if let Some(user_id) = user {
            return Ok(Self::User(user_id));
        }

        session
            .and_then(GuestId::new)
            .map(Self::Guest)
            .ok_or_else(|| StorefrontError::invalid_owner("request has neither a session nor an account"))
    }

    #[must_use]
    pub const fn kind(&self) -> OwnerKind {
        match self {
            Self::Guest(_) => OwnerKind::Guest,
            Self::User(_) => OwnerKind::User,
        }
    }

    /// Returns the account id for authenticated owners.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Guest(_) => None,
            Self::User(id) => Some(*id),
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest(id) => write!(f, "guest:{}", id),
            Self::User(id) => write!(f, "user:{}", id),
        }
    }
}

/// Set of products saved by one owner. Members are unique and kept in id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WishlistSet(BTreeSet<ProductId>);

impl WishlistSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.0.contains(product_id)
    }

    /// Inserts a product, returning false if it was already a member.
    pub fn insert(&mut self, product_id: ProductId) -> bool {
        self.0.insert(product_id)
    }

    /// Removes a product, returning false if it was not a member.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        self.0.remove(product_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProductId> {
        self.0.iter()
    }

    /// Returns the members as a vector in id order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<ProductId> {
        self.0.iter().copied().collect()
    }

    /// Merges `other` into this set without exceeding `max_items`.
    ///
    /// Existing members are always kept; incoming members are taken in id
    /// order until the cap is reached. Returns the members that did not fit.
    pub fn merge_capped(&mut self, other: &Self, max_items: usize) -> Vec<ProductId> {
        let mut overflow = Vec::new();
        for product_id in other.iter() {
            if self.contains(product_id) {
                continue;
            }
            if self.len() >= max_items {
                overflow.push(*product_id);
            } else {
                self.0.insert(*product_id);
            }
        }
        overflow
    }
}

impl FromIterator<ProductId> for WishlistSet {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for WishlistSet {
    type Item = ProductId;
    type IntoIter = std::collections::btree_set::IntoIter<ProductId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
