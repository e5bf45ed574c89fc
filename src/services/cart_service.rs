//! Local mirror of the server cart.
//!
//! Every write is followed by a full `GET /api/cart`; totals always come from
//! the server. Fetches are numbered as they are issued and a response is only
//! applied if no later-issued fetch has been applied already, so a slow,
//! superseded response can never overwrite a newer one.

use std::sync::{
    Arc,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};

use tokio::sync::RwLock;

use crate::{
    client::ApiClient,
    dto::cart::{AddToCartRequest, CartPayload, UpdateCartItemRequest},
    error::{AppError, AppResult},
    models::{Cart, CartItem, CartSummary, Id},
    validation::{Field, FieldErrors},
};

#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    client: ApiClient,
    state: RwLock<CartState>,
    issued: AtomicU64,
    in_flight: AtomicUsize,
}

#[derive(Default)]
struct CartState {
    cart: Cart,
    applied: u64,
}

impl CartStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Arc::new(CartStoreInner {
                client,
                state: RwLock::new(CartState::default()),
                issued: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
            }),
        }
    }

    /// Creates the store and performs the initial fetch. A failed initial
    /// fetch is logged and leaves the cart empty.
    pub async fn load(client: ApiClient) -> Self {
        let store = Self::new(client);
        let _ = store.fetch_cart().await;
        store
    }

    /// Drops the local cart, e.g. on logout. Fetches already in flight are
    /// treated as stale and cannot bring the old cart back.
    pub async fn reset(&self) {
        let mut state = self.inner.state.write().await;
        state.cart = Cart::default();
        state.applied = state.applied.max(self.inner.issued.load(Ordering::SeqCst));
    }

    pub async fn cart(&self) -> Cart {
        self.inner.state.read().await.cart.clone()
    }

    pub async fn summary(&self) -> CartSummary {
        self.inner.state.read().await.cart.summary
    }

    pub async fn quantity_of(&self, menu_id: Id) -> u32 {
        self.inner.state.read().await.cart.quantity_of(menu_id)
    }

    pub async fn line_for(&self, menu_id: Id) -> Option<CartItem> {
        self.inner
            .state
            .read()
            .await
            .cart
            .line_for_menu(menu_id)
            .cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Re-reads the cart from the server. On failure the current state is
    /// kept and the error is returned for the caller to present or ignore.
    pub async fn fetch_cart(&self) -> AppResult<Cart> {
        let generation = self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        let result = self.request_cart().await;
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);

        let fetched = match result {
            Ok(cart) => cart,
            Err(err) => {
                tracing::warn!(error = %err, generation, "fetch cart failed");
                return Err(err);
            }
        };

        let mut state = self.inner.state.write().await;
        if generation > state.applied {
            state.applied = generation;
            state.cart = fetched;
        } else {
            tracing::debug!(
                generation,
                applied = state.applied,
                "discarding stale cart response"
            );
        }
        Ok(state.cart.clone())
    }

    async fn request_cart(&self) -> AppResult<Cart> {
        let url = self.inner.client.endpoint("/api/cart")?;
        let response = self.inner.client.get::<CartPayload>(url).await?;
        Ok(response.data.map(Cart::from).unwrap_or_default())
    }

    pub async fn add_item(&self, restaurant_id: Id, menu_id: Id, quantity: u32) -> AppResult<Cart> {
        if quantity == 0 {
            let mut errors = FieldErrors::new();
            errors.add(Field::Quantity, "Quantity must be at least 1");
            return Err(AppError::Validation(errors));
        }
        let write = async {
            let url = self.inner.client.endpoint("/api/cart")?;
            let body = AddToCartRequest {
                restaurant_id,
                menu_id,
                quantity,
            };
            self.inner
                .client
                .post::<_, serde_json::Value>(url, &body)
                .await
        };
        self.write_then_fetch("add item", write).await
    }

    pub async fn add_one(&self, restaurant_id: Id, menu_id: Id) -> AppResult<Cart> {
        self.add_item(restaurant_id, menu_id, 1).await
    }

    /// Sets a line's quantity. Zero or negative quantities delete the line.
    pub async fn update_item(&self, item_id: Id, quantity: i64) -> AppResult<Cart> {
        if quantity <= 0 {
            return self.remove_item(item_id).await;
        }
        let Ok(quantity) = u32::try_from(quantity) else {
            let mut errors = FieldErrors::new();
            errors.add(Field::Quantity, "Quantity is too large");
            return Err(AppError::Validation(errors));
        };
        let write = async {
            let url = self.item_url(item_id)?;
            self.inner
                .client
                .put::<_, serde_json::Value>(url, &UpdateCartItemRequest { quantity })
                .await
        };
        self.write_then_fetch("update item", write).await
    }

    pub async fn remove_item(&self, item_id: Id) -> AppResult<Cart> {
        let write = async {
            let url = self.item_url(item_id)?;
            self.inner.client.delete(url).await
        };
        self.write_then_fetch("remove item", write).await
    }

    pub async fn clear_cart(&self) -> AppResult<Cart> {
        let write = async {
            let url = self.inner.client.endpoint("/api/cart")?;
            self.inner.client.delete(url).await
        };
        self.write_then_fetch("clear cart", write).await
    }

    /// Adds one of `menu_id`, creating the line if the cart has none.
    pub async fn increment(&self, restaurant_id: Id, menu_id: Id) -> AppResult<Cart> {
        match self.line_for(menu_id).await {
            Some(line) => self.update_item(line.id, i64::from(line.quantity) + 1).await,
            None => self.add_one(restaurant_id, menu_id).await,
        }
    }

    /// Takes one of `menu_id` away; the line is removed once it would hit zero.
    /// Does nothing when the menu is not in the cart.
    pub async fn decrement(&self, menu_id: Id) -> AppResult<Cart> {
        match self.line_for(menu_id).await {
            Some(line) if line.quantity <= 1 => self.remove_item(line.id).await,
            Some(line) => self.update_item(line.id, i64::from(line.quantity) - 1).await,
            None => Ok(self.cart().await),
        }
    }

    fn item_url(&self, item_id: Id) -> AppResult<url::Url> {
        self.inner.client.endpoint(&format!("/api/cart/{item_id}"))
    }

    async fn write_then_fetch<T>(
        &self,
        action: &'static str,
        write: impl Future<Output = AppResult<T>>,
    ) -> AppResult<Cart> {
        let written = write.await;
        if let Err(err) = &written {
            tracing::warn!(error = %err, action, "cart write failed");
        }
        let fetched = self.fetch_cart().await;
        written?;
        fetched
    }
}
