mod common;

use std::time::Duration;

use common::{ES_TEH, MockServer, NASI_GORENG, SATE_AYAM};
use food_order_client::{
    client::ApiClient,
    error::AppError,
    models::{Cart, MenuType},
    services::cart_service::CartStore,
    validation::Field,
};

async fn store_for(server: &MockServer) -> anyhow::Result<CartStore> {
    let client = ApiClient::new(&server.config())?;
    Ok(CartStore::new(client))
}

#[tokio::test]
async fn add_item_then_fetch_shows_requested_quantity() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let cart = store_for(&server).await?;

    let after = cart
        .add_item(NASI_GORENG.restaurant_id, NASI_GORENG.id, 2)
        .await?;

    assert_eq!(after.quantity_of(NASI_GORENG.id), 2);
    assert_eq!(cart.quantity_of(NASI_GORENG.id).await, 2);

    let group = after
        .restaurant(NASI_GORENG.restaurant_id)
        .expect("restaurant group");
    assert_eq!(group.restaurant.name, "Warung Sederhana");
    let line = &group.items[0];
    // The cart endpoint names menus via `foodName`.
    assert_eq!(line.menu.name, "Nasi Goreng");
    assert_eq!(line.menu.menu_type, MenuType::Food);
    assert_eq!(line.item_total, 20_000);
    assert_eq!(after.summary.total_items, 2);
    assert_eq!(after.summary.total_price, 20_000);
    assert_eq!(after.summary.restaurant_count, 1);
    Ok(())
}

#[tokio::test]
async fn adding_existing_menu_increments_its_line() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let cart = store_for(&server).await?;

    cart.add_item(NASI_GORENG.restaurant_id, NASI_GORENG.id, 2)
        .await?;
    let after = cart.add_one(NASI_GORENG.restaurant_id, NASI_GORENG.id).await?;

    assert_eq!(after.quantity_of(NASI_GORENG.id), 3);
    assert_eq!(after.items().count(), 1);
    Ok(())
}

#[tokio::test]
async fn add_item_rejects_zero_quantity_without_calling_server() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let cart = store_for(&server).await?;

    let err = cart
        .add_item(NASI_GORENG.restaurant_id, NASI_GORENG.id, 0)
        .await
        .expect_err("zero quantity");

    match err {
        AppError::Validation(errors) => assert!(errors.contains(Field::Quantity)),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(server.backend().cart_gets, 0);
    Ok(())
}

#[tokio::test]
async fn update_to_zero_matches_remove() -> anyhow::Result<()> {
    // Two identical backends: one line is zeroed on the first, removed on the second.
    let (left, right) = (MockServer::start().await, MockServer::start().await);
    let mut lines = Vec::new();
    for server in [&left, &right] {
        let mut backend = server.backend();
        lines.push(backend.put_line(NASI_GORENG.id, 2));
        backend.put_line(ES_TEH.id, 1);
    }
    assert_eq!(lines[0], lines[1]);

    let updated = store_for(&left).await?.update_item(lines[0], 0).await?;
    let removed = store_for(&right).await?.remove_item(lines[1]).await?;

    assert_eq!(updated, removed);
    assert!(updated.line(lines[0]).is_none());
    assert_eq!(updated.quantity_of(ES_TEH.id), 1);
    Ok(())
}

#[tokio::test]
async fn negative_quantity_removes_line() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let cart = store_for(&server).await?;
    let line = server.backend().put_line(SATE_AYAM.id, 3);

    let after = cart.update_item(line, -4).await?;

    assert!(after.is_empty());
    assert!(server.backend().lines.is_empty());
    Ok(())
}

#[tokio::test]
async fn oversized_quantity_is_rejected_not_deleted() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let cart = store_for(&server).await?;
    let line = server.backend().put_line(SATE_AYAM.id, 2);

    let err = cart
        .update_item(line, 5_000_000_000)
        .await
        .expect_err("quantity overflows");

    assert!(matches!(err, AppError::Validation(ref e) if e.contains(Field::Quantity)));
    assert_eq!(server.backend().lines.len(), 1);
    assert_eq!(server.backend().lines[0].quantity, 2);
    assert_eq!(server.backend().cart_gets, 0);
    Ok(())
}

#[tokio::test]
async fn update_item_sets_quantity() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let cart = store_for(&server).await?;
    let line = server.backend().put_line(SATE_AYAM.id, 1);

    let after = cart.update_item(line, 4).await?;

    assert_eq!(after.quantity_of(SATE_AYAM.id), 4);
    assert_eq!(after.summary.total_price, 100_000);
    Ok(())
}

#[tokio::test]
async fn increment_and_decrement_walk_a_line_up_and_away() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let cart = store_for(&server).await?;

    // No line yet: increment creates one.
    cart.increment(ES_TEH.restaurant_id, ES_TEH.id).await?;
    cart.increment(ES_TEH.restaurant_id, ES_TEH.id).await?;
    assert_eq!(cart.quantity_of(ES_TEH.id).await, 2);

    cart.decrement(ES_TEH.id).await?;
    assert_eq!(cart.quantity_of(ES_TEH.id).await, 1);

    let after = cart.decrement(ES_TEH.id).await?;
    assert!(after.is_empty());
    assert!(server.backend().lines.is_empty());

    // Nothing to take away.
    let gets = server.backend().cart_gets;
    let after = cart.decrement(ES_TEH.id).await?;
    assert!(after.is_empty());
    assert_eq!(server.backend().cart_gets, gets);
    Ok(())
}

#[tokio::test]
async fn clear_cart_empties_everything() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let cart = store_for(&server).await?;
    {
        let mut backend = server.backend();
        backend.put_line(NASI_GORENG.id, 1);
        backend.put_line(SATE_AYAM.id, 2);
    }
    let loaded = cart.fetch_cart().await?;
    assert_eq!(loaded.summary.restaurant_count, 2);

    let after = cart.clear_cart().await?;

    assert_eq!(after, Cart::default());
    assert!(cart.cart().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_write_still_refetches_and_reports_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let cart = store_for(&server).await?;
    server.backend().put_line(NASI_GORENG.id, 1);

    let err = cart.remove_item(9_999).await.expect_err("unknown line");

    assert!(matches!(err, AppError::Api { ref message, .. } if message == "cart item not found"));
    // The follow-up fetch still ran and picked up the server state.
    assert_eq!(server.backend().cart_gets, 1);
    assert_eq!(cart.quantity_of(NASI_GORENG.id).await, 1);
    Ok(())
}

#[tokio::test]
async fn failed_fetch_keeps_previous_cart() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let cart = store_for(&server).await?;
    server.backend().put_line(NASI_GORENG.id, 2);
    let before = cart.fetch_cart().await?;

    server.backend().fail_cart_get = true;
    let err = cart.fetch_cart().await.expect_err("server error");

    assert!(matches!(err, AppError::Api { ref message, .. } if message == "cart unavailable"));
    assert_eq!(cart.cart().await, before);
    assert!(!cart.is_loading());
    Ok(())
}

#[tokio::test]
async fn load_fetches_once_and_tolerates_failure() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    server.backend().put_line(ES_TEH.id, 3);
    let cart = CartStore::load(ApiClient::new(&server.config())?).await;
    assert_eq!(cart.quantity_of(ES_TEH.id).await, 3);
    assert_eq!(server.backend().cart_gets, 1);

    let base = common::unreachable_url().await;
    let config = food_order_client::config::AppConfig::for_base_url(&base)?;
    let offline = CartStore::load(ApiClient::new(&config)?).await;
    assert!(offline.cart().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn slow_stale_fetch_does_not_overwrite_newer_one() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let cart = store_for(&server).await?;
    let line = server.backend().put_line(NASI_GORENG.id, 1);
    server.backend().cart_delays_ms.extend([300, 0]);

    // First fetch sees quantity 1 but answers last; the second sees 5.
    let slow = cart.fetch_cart();
    let fast = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        server.backend().set_quantity(line, 5);
        cart.fetch_cart().await
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(fast?.quantity_of(NASI_GORENG.id), 5);
    // The stale response is dropped; the caller gets the current state.
    assert_eq!(slow?.quantity_of(NASI_GORENG.id), 5);
    assert_eq!(cart.quantity_of(NASI_GORENG.id).await, 5);
    Ok(())
}

#[tokio::test]
async fn concurrent_updates_settle_on_latest_fetch() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let cart = store_for(&server).await?;
    let line = server.backend().put_line(SATE_AYAM.id, 1);
    cart.fetch_cart().await?;

    let (first, second) = tokio::join!(cart.update_item(line, 2), cart.update_item(line, 3));
    first?;
    second?;

    let local = cart.cart().await;
    let server_quantity = server.backend().lines[0].quantity;
    // Whichever write landed last, the mirror agrees with the server.
    assert_eq!(i64::from(local.quantity_of(SATE_AYAM.id)), server_quantity);
    Ok(())
}
