use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use food_order_client::{
    config::AppConfig,
    services::{or_empty, order_service::StatusFilter},
    state::AppState,
    storage::SessionPersistence,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,food_order_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let persistence = SessionPersistence::with_file(&config.session_file);
    let state = AppState::init(&config, persistence).await?;

    match state.auth.user().await {
        Some(user) => tracing::info!(user_id = user.id, name = %user.name, "signed in"),
        None => tracing::info!("no stored session"),
    }

    let recommended = or_empty(state.restaurants.recommended().await, "recommended restaurants");
    for restaurant in &recommended {
        tracing::info!(
            id = restaurant.id,
            name = %restaurant.name,
            star = restaurant.star,
            "recommended"
        );
    }

    let summary = state.cart.summary().await;
    tracing::info!(
        items = summary.total_items,
        restaurants = summary.restaurant_count,
        total = summary.total_price,
        "cart"
    );

    if state.auth.is_logged_in().await {
        let orders = or_empty(state.orders.my_orders(StatusFilter::All).await, "orders");
        tracing::info!(count = orders.len(), "orders");
    }

    Ok(())
}
