use serde::{Deserialize, Serialize};

use super::{cart::RawRestaurantRef, loose};
use crate::{
    error::{AppError, AppResult},
    models::{Cart, Id, Order, OrderItem, OrderRestaurant, OrderStatus, Pricing},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub menu_id: Id,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRestaurant {
    pub restaurant_id: Id,
    pub items: Vec<CheckoutItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub restaurants: Vec<CheckoutRestaurant>,
    pub delivery_address: String,
    pub phone: String,
    pub payment_method: String,
    pub notes: String,
}

impl CheckoutRequest {
    /// Restaurant/menu/quantity triples for every line currently in `cart`.
    pub fn lines_from(cart: &Cart) -> Vec<CheckoutRestaurant> {
        cart.restaurants
            .iter()
            .filter(|rc| !rc.items.is_empty())
            .map(|rc| CheckoutRestaurant {
                restaurant_id: rc.restaurant.id,
                items: rc
                    .items
                    .iter()
                    .map(|it| CheckoutItem {
                        menu_id: it.menu.id,
                        quantity: it.quantity,
                    })
                    .collect(),
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    #[serde(default)]
    pub transaction_id: Option<String>,
}

/// `POST /api/order/checkout` data: `{order: {...}}` or the order itself.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    #[serde(default)]
    pub order: Option<CreatedOrder>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

impl CheckoutPayload {
    pub fn transaction_id(self) -> Option<String> {
        self.order
            .and_then(|o| o.transaction_id)
            .or(self.transaction_id)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPricing {
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub subtotal: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub service_fee: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub delivery_fee: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub total_price: Option<i64>,
}

impl From<RawPricing> for Pricing {
    fn from(raw: RawPricing) -> Self {
        Self {
            subtotal: raw.subtotal.unwrap_or(0),
            service_fee: raw.service_fee.unwrap_or(0),
            delivery_fee: raw.delivery_fee.unwrap_or(0),
            total_price: raw.total_price.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrderItem {
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub menu_id: Option<i64>,
    #[serde(default)]
    pub menu_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub price: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub item_total: Option<i64>,
}

impl From<RawOrderItem> for OrderItem {
    fn from(raw: RawOrderItem) -> Self {
        Self {
            menu_id: raw.menu_id.unwrap_or(0),
            menu_name: raw.menu_name.or(raw.name).unwrap_or_default(),
            price: raw.price.unwrap_or(0),
            image: raw.image.filter(|i| !i.is_empty()),
            quantity: loose::non_negative_u32(raw.quantity),
            item_total: raw.item_total.unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrderRestaurant {
    #[serde(default)]
    pub restaurant: Option<RawRestaurantRef>,
    #[serde(default)]
    pub items: Option<Vec<RawOrderItem>>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub subtotal: Option<i64>,
}

impl From<RawOrderRestaurant> for OrderRestaurant {
    fn from(raw: RawOrderRestaurant) -> Self {
        Self {
            restaurant: raw.restaurant.unwrap_or_default().into(),
            items: raw
                .items
                .unwrap_or_default()
                .into_iter()
                .map(OrderItem::from)
                .collect(),
            subtotal: raw.subtotal.unwrap_or(0),
        }
    }
}

/// Order as sent by `GET /api/order/my-order`. Every field is optional on
/// the wire; `into` fills the gaps.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_string")]
    pub transaction_id: Option<String>,
    #[serde(default, deserialize_with = "loose::opt_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default, deserialize_with = "loose::opt_string")]
    pub phone: Option<String>,
    #[serde(default)]
    pub pricing: Option<RawPricing>,
    #[serde(default)]
    pub restaurants: Option<Vec<RawOrderRestaurant>>,
    #[serde(default, deserialize_with = "loose::opt_string")]
    pub created_at: Option<String>,
}

impl From<RawOrder> for Order {
    fn from(raw: RawOrder) -> Self {
        Self {
            id: raw.id.unwrap_or(0),
            transaction_id: raw.transaction_id.unwrap_or_default(),
            status: raw
                .status
                .as_deref()
                .map_or(OrderStatus::Unknown, OrderStatus::from_wire),
            payment_method: raw.payment_method.unwrap_or_default(),
            delivery_address: raw.delivery_address.unwrap_or_default(),
            phone: raw.phone.unwrap_or_default(),
            pricing: raw.pricing.unwrap_or_default().into(),
            restaurants: raw
                .restaurants
                .unwrap_or_default()
                .into_iter()
                .map(OrderRestaurant::from)
                .collect(),
            created_at: raw.created_at.as_deref().and_then(loose::timestamp),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct OrderListPayload {
    #[serde(default)]
    orders: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OrderListBody {
    #[serde(default)]
    data: Option<OrderListPayload>,
    #[serde(default)]
    orders: Option<Vec<serde_json::Value>>,
}

/// Orders from `GET /api/order/my-order`, which answers with `data.orders`
/// or, on some deployments, a top-level `orders`. An entry that is not an
/// object at all is logged and skipped; the rest of the history survives.
pub fn orders_from_body(body: serde_json::Value) -> AppResult<Vec<Order>> {
    let body: OrderListBody = serde_json::from_value(body).map_err(AppError::Serialization)?;
    let entries = body
        .data
        .map(|d| d.orders)
        .filter(|orders| !orders.is_empty())
        .or(body.orders)
        .unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<RawOrder>(entry) {
            Ok(raw) => Some(Order::from(raw)),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable order");
                None
            }
        })
        .collect())
}
