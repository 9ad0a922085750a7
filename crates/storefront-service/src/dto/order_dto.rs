use serde::{Deserialize, Serialize};
use storefront_core::OrderNumber;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNumberResponse {
    pub order_number: String,
    pub date_key: String,
    pub counter: u64,
}

impl From<OrderNumber> for OrderNumberResponse {
    fn from(number: OrderNumber) -> Self {
        Self {
            date_key: number.date_key().to_string(),
            counter: number.counter(),
            order_number: number.into_string(),
        }
    }
}
