use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Id = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Identity and bearer token of a signed-in user. The two are always set and
/// cleared together.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MenuType {
    Food,
    Drink,
    Other(String),
}

impl From<String> for MenuType {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "food" => MenuType::Food,
            "drink" => MenuType::Drink,
            _ => MenuType::Other(value),
        }
    }
}

impl From<MenuType> for String {
    fn from(value: MenuType) -> Self {
        match value {
            MenuType::Food => "food".into(),
            MenuType::Drink => "drink".into(),
            MenuType::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: Id,
    pub name: String,
    pub price: i64,
    #[serde(rename = "type")]
    pub menu_type: MenuType,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRef {
    pub id: Id,
    pub name: String,
    pub logo: Option<String>,
}

/// One cart line. Present lines always have `quantity >= 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: Id,
    pub menu: Menu,
    pub quantity: u32,
    pub item_total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantCart {
    pub restaurant: RestaurantRef,
    pub items: Vec<CartItem>,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartSummary {
    pub total_items: u32,
    pub total_price: i64,
    pub restaurant_count: u32,
}

/// Server-side cart grouped per restaurant. Totals are whatever the server
/// computed; nothing here recomputes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub restaurants: Vec<RestaurantCart>,
    pub summary: CartSummary,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.restaurants.iter().all(|rc| rc.items.is_empty())
    }

    pub fn restaurant(&self, restaurant_id: Id) -> Option<&RestaurantCart> {
        self.restaurants
            .iter()
            .find(|rc| rc.restaurant.id == restaurant_id)
    }

    pub fn line(&self, item_id: Id) -> Option<&CartItem> {
        self.items().find(|item| item.id == item_id)
    }

    pub fn line_for_menu(&self, menu_id: Id) -> Option<&CartItem> {
        self.items().find(|item| item.menu.id == menu_id)
    }

    pub fn quantity_of(&self, menu_id: Id) -> u32 {
        self.line_for_menu(menu_id).map_or(0, |item| item.quantity)
    }

    pub fn items(&self) -> impl Iterator<Item = &CartItem> {
        self.restaurants.iter().flat_map(|rc| rc.items.iter())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: Id,
    pub name: String,
    pub star: f64,
    pub place: Option<String>,
    pub logo: Option<String>,
    pub images: Vec<String>,
    pub category: Option<String>,
    pub review_count: u32,
    pub menu_count: u32,
    pub price_range: PriceRange,
    /// Kilometres from the user, when the server knows it.
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAuthor {
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Id,
    pub user: ReviewAuthor,
    pub star: f64,
    pub comment: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantDetail {
    pub restaurant: Restaurant,
    pub menus: Vec<Menu>,
    pub reviews: Vec<Review>,
}

impl RestaurantDetail {
    pub fn menus_of(&self, menu_type: &MenuType) -> impl Iterator<Item = &Menu> {
        self.menus.iter().filter(move |m| &m.menu_type == menu_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Preparing,
    OnTheWay,
    Delivered,
    Done,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "preparing" => OrderStatus::Preparing,
            "on_the_way" => OrderStatus::OnTheWay,
            "delivered" => OrderStatus::Delivered,
            "done" => OrderStatus::Done,
            "canceled" | "cancelled" => OrderStatus::Canceled,
            _ => OrderStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Preparing => "preparing",
            OrderStatus::OnTheWay => "on_the_way",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Done => "done",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(default)]
    pub subtotal: i64,
    #[serde(default)]
    pub service_fee: i64,
    #[serde(default)]
    pub delivery_fee: i64,
    #[serde(default)]
    pub total_price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub menu_id: Id,
    #[serde(default)]
    pub menu_name: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub item_total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRestaurant {
    pub restaurant: RestaurantRef,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub subtotal: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Id,
    pub transaction_id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub pricing: Pricing,
    #[serde(default)]
    pub restaurants: Vec<OrderRestaurant>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn restaurant_names(&self) -> impl Iterator<Item = &str> {
        self.restaurants.iter().map(|r| r.restaurant.name.as_str())
    }

    pub fn menu_names(&self) -> impl Iterator<Item = &str> {
        self.restaurants
            .iter()
            .flat_map(|r| r.items.iter().map(|it| it.menu_name.as_str()))
    }
}
