//! Guest to account wishlist reconciliation at login.

use crate::cache::{CacheKeys, CacheStore};
use std::sync::Arc;
use storefront_config::WishlistConfig;
use storefront_core::{GuestId, Owner, StorefrontResult, UserId, WishlistSet};
use storefront_repository::WishlistRepository;
use tracing::{info, warn};

/// Folds a guest session's wishlist into the account that just logged in.
pub struct ReconciliationService {
    wishlists: Arc<dyn WishlistRepository>,
    cache: CacheStore,
    keys: CacheKeys,
    max_items: usize,
}

impl ReconciliationService {
    pub fn new(
        wishlists: Arc<dyn WishlistRepository>,
        cache: CacheStore,
        keys: CacheKeys,
        config: &WishlistConfig,
    ) -> Self {
        Self {
            wishlists,
            cache,
            keys,
            max_items: config.max_items,
        }
    }

    /// Merges the guest wishlist into the user's and returns the result.
    ///
    /// Every product the user already had is kept. Guest products are added
    /// in id order until the wishlist is full; the rest are dropped. The
    /// merged set is persisted before the user's cache entry is replaced and
    /// the guest entry deleted, so running the merge again is harmless.
    pub async fn merge(&self, guest_id: &GuestId, user_id: UserId) -> StorefrontResult<WishlistSet> {
        let guest_key = self.keys.wishlist(&Owner::Guest(guest_id.clone()));
        let user_key = self.keys.wishlist(&Owner::User(user_id));

        let guest_items: WishlistSet = self.cache.get_json(&guest_key).await.unwrap_or_default();
        let user_items = self.wishlists.list(user_id).await?;

        let mut merged = user_items.clone();
        let overflow = merged.merge_capped(&guest_items, self.max_items);
        if !overflow.is_empty() {
            warn!(
                "Dropped {} guest wishlist items merging {} into user {}: wishlist is full",
                overflow.len(),
                guest_id,
                user_id
            );
        }

        if merged != user_items {
            self.wishlists.add_all(user_id, &merged).await?;
        }
        self.cache.set_json(&user_key, &merged, None).await;
        self.cache.delete(&guest_key).await;

        info!(
            "Merged {} guest items into user {} ({} total)",
            merged.len() - user_items.len(),
            user_id,
            merged.len()
        );
        Ok(merged)
    }
}

impl std::fmt::Debug for ReconciliationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationService")
            .field("max_items", &self.max_items)
            .finish_non_exhaustive()
    }
}
