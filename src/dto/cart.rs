use serde::{Deserialize, Serialize};

use super::{loose, restaurants::RawMenu};
use crate::models::{Cart, CartItem, CartSummary, Id, RestaurantCart, RestaurantRef};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub restaurant_id: Id,
    pub menu_id: Id,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

/// `GET /api/cart` data: either `{cart, summary}` or the grouped list itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CartPayload {
    Bare(Vec<RawRestaurantCart>),
    Grouped {
        #[serde(default)]
        cart: Vec<RawRestaurantCart>,
        #[serde(default)]
        summary: Option<CartSummary>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRestaurantRef {
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

impl From<RawRestaurantRef> for RestaurantRef {
    fn from(raw: RawRestaurantRef) -> Self {
        Self {
            id: raw.id.unwrap_or(0),
            name: raw.name.unwrap_or_default(),
            logo: raw.logo.filter(|l| !l.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCartItem {
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub id: Option<i64>,
    pub menu: RawMenu,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub menu_id: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub item_total: Option<i64>,
}

impl RawCartItem {
    fn into_item(self) -> Option<CartItem> {
        let quantity = loose::non_negative_u32(self.quantity);
        if quantity == 0 {
            return None;
        }
        let mut menu = self.menu.into_menu();
        if menu.id == 0 {
            menu.id = self.menu_id.unwrap_or(0);
        }
        Some(CartItem {
            id: self.id.unwrap_or(0),
            menu,
            quantity,
            item_total: self.item_total.unwrap_or(0),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRestaurantCart {
    pub restaurant: RawRestaurantRef,
    #[serde(default)]
    pub items: Vec<RawCartItem>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub subtotal: Option<i64>,
}

impl From<RawRestaurantCart> for RestaurantCart {
    fn from(raw: RawRestaurantCart) -> Self {
        Self {
            restaurant: raw.restaurant.into(),
            items: raw
                .items
                .into_iter()
                .filter_map(RawCartItem::into_item)
                .collect(),
            subtotal: raw.subtotal.unwrap_or(0),
        }
    }
}

impl From<CartPayload> for Cart {
    fn from(payload: CartPayload) -> Self {
        let (groups, summary) = match payload {
            CartPayload::Bare(groups) => (groups, None),
            CartPayload::Grouped { cart, summary } => (cart, summary),
        };
        Self {
            restaurants: groups
                .into_iter()
                .map(RestaurantCart::from)
                .filter(|rc| !rc.items.is_empty())
                .collect(),
            summary: summary.unwrap_or_default(),
        }
    }
}
