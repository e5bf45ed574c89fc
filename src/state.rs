use crate::{
    client::ApiClient,
    config::AppConfig,
    error::AppResult,
    services::{
        auth_service::AuthStore, cart_service::CartStore, order_service::OrderService,
        restaurant_service::RestaurantService, review_service::ReviewService,
    },
    storage::SessionPersistence,
};

/// Everything a view needs, passed explicitly instead of living in globals.
/// Cloning is cheap; all clones share the same stores.
#[derive(Clone)]
pub struct AppState {
    pub client: ApiClient,
    pub auth: AuthStore,
    pub cart: CartStore,
    pub restaurants: RestaurantService,
    pub orders: OrderService,
    pub reviews: ReviewService,
}

impl AppState {
    /// Wires the stores together without touching the network.
    pub fn new(config: &AppConfig, persistence: SessionPersistence) -> AppResult<Self> {
        let client = ApiClient::new(config)?;
        Ok(Self {
            auth: AuthStore::new(client.clone(), persistence),
            cart: CartStore::new(client.clone()),
            restaurants: RestaurantService::new(client.clone()),
            orders: OrderService::new(client.clone()),
            reviews: ReviewService::new(client.clone()),
            client,
        })
    }

    /// Signs out and discards the signed-in user's cart.
    pub async fn logout(&self) -> AppResult<()> {
        let signed_out = self.auth.logout().await;
        self.cart.reset().await;
        signed_out
    }

    /// Restores the stored session, then loads the cart once.
    pub async fn init(config: &AppConfig, persistence: SessionPersistence) -> AppResult<Self> {
        let state = Self::new(config, persistence)?;
        state.auth.restore().await?;
        // a cart that fails to load stays empty until the next fetch
        let _ = state.cart.fetch_cart().await;
        Ok(state)
    }
}
