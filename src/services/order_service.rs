use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Serialize;

use crate::{
    client::ApiClient,
    dto::orders::{CheckoutPayload, CheckoutRequest, orders_from_body},
    error::{AppError, AppResult},
    models::{Order, OrderStatus},
    services::cart_service::CartStore,
    validation::{Field, FieldErrors},
};

pub const DELIVERY_FEE: i64 = 10_000;
pub const SERVICE_FEE: i64 = 1_000;
const CHECKOUT_FALLBACK: &str = "Checkout failed, please try again";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PaymentMethod {
    #[default]
    Bni,
    Bri,
    Bca,
    Mandiri,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Bni => "BNI Bank Negara Indonesia",
            PaymentMethod::Bri => "BRI Bank Rakyat Indonesia",
            PaymentMethod::Bca => "BCA Bank Central Asia",
            PaymentMethod::Mandiri => "Mandiri",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub delivery_address: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
    pub notes: String,
}

impl CheckoutForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.delivery_address.trim().is_empty() {
            errors.add(Field::DeliveryAddress, "Delivery address is required");
        }
        if self.phone.trim().is_empty() {
            errors.add(Field::Phone, "Phone number is required");
        }
        errors.into_result()
    }
}

/// Totals captured at the moment an order was placed, for the confirmation
/// view. Nothing re-reads these from the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    pub transaction_id: Option<String>,
    pub placed_at: DateTime<Utc>,
    pub payment_method: String,
    pub total_items: u32,
    pub items_price: i64,
    pub delivery_fee: i64,
    pub service_fee: i64,
    pub total_pay: i64,
}

#[derive(Clone)]
pub struct OrderService {
    client: ApiClient,
}

impl OrderService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn my_orders(&self, filter: StatusFilter) -> AppResult<Vec<Order>> {
        let mut url = self.client.endpoint("/api/order/my-order")?;
        if let StatusFilter::Only(status) = filter {
            url.query_pairs_mut().append_pair("status", status.as_str());
        }
        let body = self.client.send_value(Method::GET, url, None).await?;
        orders_from_body(body)
    }

    pub async fn search_my_orders(&self, filter: StatusFilter, query: &str) -> AppResult<Vec<Order>> {
        let orders = self.my_orders(filter).await?;
        Ok(search_orders(orders, query))
    }

    /// Places an order for everything in `cart`, then empties the cart.
    /// A rejected checkout leaves the cart as it was.
    pub async fn checkout(&self, cart: &CartStore, form: &CheckoutForm) -> AppResult<CheckoutReceipt> {
        form.validate().map_err(AppError::Validation)?;

        let snapshot = cart.cart().await;
        if snapshot.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let request = CheckoutRequest {
            restaurants: CheckoutRequest::lines_from(&snapshot),
            delivery_address: form.delivery_address.trim().to_string(),
            phone: form.phone.trim().to_string(),
            payment_method: form.payment_method.label().to_string(),
            notes: form.notes.clone(),
        };

        let url = self.client.endpoint("/api/order/checkout")?;
        let response = match self.client.post::<_, CheckoutPayload>(url, &request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "checkout failed");
                let message = match &err {
                    AppError::Http(_) => err.to_string(),
                    _ => err.server_message().unwrap_or(CHECKOUT_FALLBACK).to_string(),
                };
                return Err(AppError::Checkout(message));
            }
        };
        let transaction_id = response.data.and_then(CheckoutPayload::transaction_id);
        tracing::info!(transaction_id = ?transaction_id, "order placed");

        if let Err(err) = cart.clear_cart().await {
            tracing::warn!(error = %err, "clearing cart after checkout failed");
        }

        let items_price = snapshot.summary.total_price;
        Ok(CheckoutReceipt {
            transaction_id,
            placed_at: Utc::now(),
            payment_method: form.payment_method.label().to_string(),
            total_items: snapshot.summary.total_items,
            items_price,
            delivery_fee: DELIVERY_FEE,
            service_fee: SERVICE_FEE,
            total_pay: items_price + DELIVERY_FEE + SERVICE_FEE,
        })
    }
}

/// Orders whose restaurant names or menu names contain `query`,
/// case-insensitively. A blank query keeps everything.
pub fn search_orders(orders: Vec<Order>, query: &str) -> Vec<Order> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return orders;
    }
    orders
        .into_iter()
        .filter(|order| {
            let restaurants = order.restaurant_names().collect::<Vec<_>>().join(" ");
            let menus = order.menu_names().collect::<Vec<_>>().join(" ");
            restaurants.to_lowercase().contains(&needle) || menus.to_lowercase().contains(&needle)
        })
        .collect()
}
