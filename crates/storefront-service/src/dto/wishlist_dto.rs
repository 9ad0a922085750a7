use serde::{Deserialize, Serialize};
use storefront_core::{Owner, OwnerKind, ProductId, WishlistSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistResponse {
    pub owner_kind: OwnerKind,
    pub items: Vec<ProductId>,
    pub count: usize,
    pub max_items: usize,
}

impl WishlistResponse {
    #[must_use]
    pub fn new(owner: &Owner, items: &WishlistSet, max_items: usize) -> Self {
        Self {
            owner_kind: owner.kind(),
            items: items.to_vec(),
            count: items.len(),
            max_items,
        }
    }
}
