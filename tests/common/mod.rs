#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post, put},
};
use food_order_client::config::AppConfig;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy)]
pub struct MenuEntry {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: &'static str,
    pub price: i64,
    pub kind: &'static str,
}

pub const NASI_GORENG: MenuEntry = MenuEntry {
    id: 101,
    restaurant_id: 1,
    name: "Nasi Goreng",
    price: 10_000,
    kind: "food",
};
pub const ES_TEH: MenuEntry = MenuEntry {
    id: 102,
    restaurant_id: 1,
    name: "Es Teh",
    price: 5_000,
    kind: "drink",
};
pub const SATE_AYAM: MenuEntry = MenuEntry {
    id: 201,
    restaurant_id: 2,
    name: "Sate Ayam",
    price: 25_000,
    kind: "food",
};

pub const MENUS: [MenuEntry; 3] = [NASI_GORENG, ES_TEH, SATE_AYAM];
pub const RESTAURANTS: [(i64, &str); 2] = [(1, "Warung Sederhana"), (2, "Sate Pak Kumis")];

pub const GOOD_PASSWORD: &str = "secret123";
pub const TAKEN_EMAIL: &str = "taken@example.com";

#[derive(Debug, Clone)]
pub struct Line {
    pub id: i64,
    pub menu_id: i64,
    pub quantity: i64,
}

#[derive(Default)]
pub struct Backend {
    pub lines: Vec<Line>,
    pub next_line_id: i64,
    pub cart_delays_ms: VecDeque<u64>,
    pub fail_cart_get: bool,
    pub checkout_error: Option<String>,
    pub checkouts: Vec<Value>,
    pub reviews: Vec<Value>,
    pub authorizations: Vec<Option<String>>,
    pub status_queries: Vec<Option<String>>,
    pub cart_gets: usize,
    pub auth_requests: usize,
}

impl Backend {
    pub fn put_line(&mut self, menu_id: i64, quantity: i64) -> i64 {
        self.next_line_id += 1;
        let id = self.next_line_id;
        self.lines.push(Line {
            id,
            menu_id,
            quantity,
        });
        id
    }

    pub fn set_quantity(&mut self, line_id: i64, quantity: i64) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.id == line_id) {
            line.quantity = quantity;
        }
    }
}

pub type Shared = Arc<Mutex<Backend>>;

pub struct MockServer {
    pub base_url: String,
    pub backend: Shared,
}

impl MockServer {
    pub async fn start() -> Self {
        let backend: Shared = Arc::new(Mutex::new(Backend {
            next_line_id: 500,
            ..Backend::default()
        }));
        let app = router(backend.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend");
        });
        Self {
            base_url: format!("http://{addr}"),
            backend,
        }
    }

    pub fn config(&self) -> AppConfig {
        AppConfig::for_base_url(&self.base_url).expect("valid base url")
    }

    pub fn backend(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().expect("backend lock")
    }
}

/// Base url of a port nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind spare port");
    let addr = listener.local_addr().expect("spare port address");
    drop(listener);
    format!("http://{addr}")
}

fn router(backend: Shared) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/cart/{id}", put(update_line).delete(remove_line))
        .route("/api/order/checkout", post(checkout))
        .route("/api/order/my-order", get(my_orders))
        .route("/api/review", post(create_review))
        .route("/api/resto", get(list_restaurants))
        .route("/api/resto/recommended", get(recommended))
        .route("/api/resto/{id}", get(restaurant_detail))
        .with_state(backend)
}

type Reply = (StatusCode, Json<Value>);

fn ok(data: Value) -> Reply {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": "OK", "data": data })),
    )
}

fn fail(status: StatusCode, message: &str) -> Reply {
    (
        status,
        Json(json!({ "success": false, "message": message })),
    )
}

fn menu(id: i64) -> Option<MenuEntry> {
    MENUS.iter().copied().find(|m| m.id == id)
}

fn user_json(name: &str, email: &str) -> Value {
    json!({
        "id": 7,
        "name": name,
        "email": email,
        "phone": "0812000000",
        "createdAt": "2026-01-01T00:00:00Z"
    })
}

async fn login(State(backend): State<Shared>, Json(body): Json<Value>) -> Reply {
    backend.lock().expect("backend lock").auth_requests += 1;
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if body["password"].as_str() != Some(GOOD_PASSWORD) {
        return fail(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    ok(json!({ "user": user_json("Budi", &email), "token": format!("token-{email}") }))
}

async fn register(State(backend): State<Shared>, Json(body): Json<Value>) -> Reply {
    backend.lock().expect("backend lock").auth_requests += 1;
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if email == TAKEN_EMAIL {
        return fail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let name = body["name"].as_str().unwrap_or_default().to_string();
    ok(json!({ "user": user_json(&name, &email), "token": format!("token-{email}") }))
}

pub fn cart_json(backend: &Backend) -> Value {
    let mut groups = Vec::new();
    let mut total_items = 0;
    let mut total_price = 0;
    for (restaurant_id, restaurant_name) in RESTAURANTS {
        let items: Vec<Value> = backend
            .lines
            .iter()
            .filter_map(|line| {
                let m = menu(line.menu_id)?;
                (m.restaurant_id == restaurant_id).then(|| {
                    json!({
                        "id": line.id,
                        "menu": {
                            "id": m.id,
                            "foodName": m.name,
                            "price": m.price,
                            "type": m.kind,
                            "image": null
                        },
                        "quantity": line.quantity,
                        "itemTotal": m.price * line.quantity
                    })
                })
            })
            .collect();
        if items.is_empty() {
            continue;
        }
        let subtotal: i64 = items.iter().filter_map(|i| i["itemTotal"].as_i64()).sum();
        total_items += items.iter().filter_map(|i| i["quantity"].as_i64()).sum::<i64>();
        total_price += subtotal;
        groups.push(json!({
            "restaurant": {
                "id": restaurant_id,
                "name": restaurant_name,
                "logo": format!("https://img.example/{restaurant_id}.png")
            },
            "items": items,
            "subtotal": subtotal
        }));
    }
    json!({
        "cart": groups,
        "summary": {
            "totalItems": total_items,
            "totalPrice": total_price,
            "restaurantCount": groups.len()
        }
    })
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn get_cart(State(backend): State<Shared>, headers: HeaderMap) -> Reply {
    let (delay, body, failing) = {
        let mut b = backend.lock().expect("backend lock");
        b.authorizations.push(authorization(&headers));
        b.cart_gets += 1;
        (
            b.cart_delays_ms.pop_front().unwrap_or(0),
            cart_json(&b),
            b.fail_cart_get,
        )
    };
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if failing {
        return fail(StatusCode::INTERNAL_SERVER_ERROR, "cart unavailable");
    }
    ok(body)
}

async fn add_to_cart(State(backend): State<Shared>, Json(body): Json<Value>) -> Reply {
    let menu_id = body["menuId"].as_i64().unwrap_or_default();
    let quantity = body["quantity"].as_i64().unwrap_or_default();
    if menu(menu_id).is_none() || body["restaurantId"].as_i64().is_none() {
        return fail(StatusCode::BAD_REQUEST, "menu not found");
    }
    if quantity <= 0 {
        return fail(StatusCode::BAD_REQUEST, "quantity must be greater than 0");
    }
    let mut b = backend.lock().expect("backend lock");
    let id = match b.lines.iter_mut().find(|l| l.menu_id == menu_id) {
        Some(line) => {
            line.quantity += quantity;
            line.id
        }
        None => b.put_line(menu_id, quantity),
    };
    ok(json!({ "id": id }))
}

async fn update_line(
    State(backend): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    let quantity = body["quantity"].as_i64().unwrap_or_default();
    if quantity <= 0 {
        return fail(StatusCode::BAD_REQUEST, "quantity must be greater than 0");
    }
    let mut b = backend.lock().expect("backend lock");
    match b.lines.iter_mut().find(|l| l.id == id) {
        Some(line) => {
            line.quantity = quantity;
            ok(json!({ "id": id, "quantity": quantity }))
        }
        None => fail(StatusCode::NOT_FOUND, "cart item not found"),
    }
}

async fn remove_line(State(backend): State<Shared>, Path(id): Path<i64>) -> Reply {
    let mut b = backend.lock().expect("backend lock");
    let before = b.lines.len();
    b.lines.retain(|l| l.id != id);
    if b.lines.len() == before {
        return fail(StatusCode::NOT_FOUND, "cart item not found");
    }
    ok(json!({}))
}

async fn clear_cart(State(backend): State<Shared>) -> Reply {
    backend.lock().expect("backend lock").lines.clear();
    ok(json!({}))
}

async fn checkout(State(backend): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut b = backend.lock().expect("backend lock");
    b.checkouts.push(body);
    if let Some(message) = b.checkout_error.clone() {
        return fail(StatusCode::BAD_REQUEST, &message);
    }
    ok(json!({ "order": { "id": 1, "transactionId": "TX-0001" } }))
}

fn order_json(id: i64, status: &str, restaurant: &str, menu_name: &str) -> Value {
    json!({
        "id": id,
        "transactionId": format!("TX-{id:04}"),
        "status": status,
        "paymentMethod": "BNI Bank Negara Indonesia",
        "deliveryAddress": "Jl. Sudirman No. 25",
        "phone": "0812",
        "pricing": { "subtotal": 20000, "serviceFee": 1000, "deliveryFee": 10000, "totalPrice": 31000 },
        "restaurants": [{
            "restaurant": { "id": id, "name": restaurant, "logo": "" },
            "items": [{
                "menuId": id * 10,
                "menuName": menu_name,
                "price": 10000,
                "image": "",
                "quantity": 2,
                "itemTotal": 20000
            }],
            "subtotal": 20000
        }],
        "createdAt": "2026-02-01T10:00:00Z"
    })
}

async fn my_orders(
    State(backend): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let status = params.get("status").cloned();
    backend
        .lock()
        .expect("backend lock")
        .status_queries
        .push(status.clone());
    let orders = vec![
        order_json(1, "preparing", "Warung Sederhana", "Nasi Goreng"),
        order_json(2, "done", "Sate Pak Kumis", "Sate Ayam"),
        order_json(3, "on_the_way", "Bakso Mas Bro", "Bakso Urat"),
    ];
    let filtered: Vec<Value> = orders
        .into_iter()
        .filter(|o| status.as_deref().is_none_or(|s| o["status"] == s))
        .collect();
    ok(json!({ "orders": filtered }))
}

async fn create_review(State(backend): State<Shared>, Json(body): Json<Value>) -> Reply {
    backend.lock().expect("backend lock").reviews.push(body);
    ok(json!({ "id": 1 }))
}

fn restaurants_json() -> Value {
    json!([
        {
            "id": 1, "name": "Warung Sederhana", "star": "4.8", "place": "Jakarta",
            "logo": "https://img.example/1.png", "distance": 0.8,
            "priceRange": { "min": 5000, "max": 20000 }, "reviewCount": 12, "menuCount": 2
        },
        {
            "id": 2, "name": "Sate Pak Kumis", "star": 4.1, "place": "Bandung",
            "distance": "2.5", "priceRange": { "min": "25000", "max": 60000 }
        },
        {
            "id": 3, "name": "Bakso Mas Bro", "star": null, "place": null,
            "priceRange": null
        }
    ])
}

async fn list_restaurants() -> Reply {
    ok(json!({
        "restaurants": restaurants_json(),
        "pagination": { "page": 1, "limit": 20, "total": 3, "totalPages": 1 }
    }))
}

async fn recommended() -> Reply {
    ok(json!({ "recommendations": restaurants_json() }))
}

async fn restaurant_detail(Path(id): Path<String>) -> Reply {
    if id != "1" {
        return fail(StatusCode::NOT_FOUND, "Restaurant not found");
    }
    ok(json!({
        "id": 1,
        "name": "Warung Sederhana",
        "star": 4.8,
        "images": ["https://img.example/1a.png", "https://img.example/1b.png"],
        "menus": [
            { "menu": { "id": 101, "name": "Nasi Goreng", "price": 10000, "type": "food" } },
            { "menuId": 102, "menuName": "Es Teh", "price": "5000", "type": "drink", "image": "https://img.example/teh.png" },
            { "id": 103, "foodName": "Mie Ayam", "price": 12000, "type": "food" }
        ],
        "reviews": [
            { "id": 9, "user": { "name": "Sari" }, "rating": 5, "comment": "Enak!", "createdAt": "2026-03-01T08:30:00Z" },
            { "id": 10, "user": { "name": "Andi", "avatar": "" }, "star": "4", "comment": "Lumayan" }
        ]
    }))
}
