//! In-memory mock of the TD Ameritrade REST API.
//!
//! Saved orders are stored per account so create/get/list/replace/delete can
//! be exercised end to end. Every other route echoes the request back as
//! JSON (`method`, `path`, `query`, `body`), which lets client tests assert on
//! exactly what went over the wire. Market data and instrument routes answer
//! 401 when the `apikey` query parameter is missing.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    saved_orders: HashMap<(String, u64), Map<String, Value>>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route(
            "/v1/accounts/{account_id}/savedorders",
            get(list_saved_orders).post(create_saved_order),
        )
        .route(
            "/v1/accounts/{account_id}/savedorders/{order_id}",
            get(get_saved_order)
                .put(replace_saved_order)
                .delete(delete_saved_order),
        )
        .fallback(echo)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn create_saved_order(
    State(db): State<Db>,
    Path(account_id): Path<String>,
    Json(mut order): Json<Map<String, Value>>,
) -> impl IntoResponse {
    let mut store = db.write().await;
    store.next_id += 1;
    let id = store.next_id;
    order.insert("savedOrderId".to_string(), json!(id));
    store.saved_orders.insert((account_id.clone(), id), order);
    tracing::debug!(%account_id, id, "saved order created");

    let location = format!("/v1/accounts/{account_id}/savedorders/{id}");
    (StatusCode::CREATED, [(header::LOCATION, location)])
}

async fn list_saved_orders(
    State(db): State<Db>,
    Path(account_id): Path<String>,
) -> Json<Vec<Map<String, Value>>> {
    let store = db.read().await;
    let mut orders: Vec<(u64, Map<String, Value>)> = store
        .saved_orders
        .iter()
        .filter(|((account, _), _)| *account == account_id)
        .map(|((_, id), order)| (*id, order.clone()))
        .collect();
    orders.sort_by_key(|(id, _)| *id);
    Json(orders.into_iter().map(|(_, order)| order).collect())
}

async fn get_saved_order(
    State(db): State<Db>,
    Path((account_id, order_id)): Path<(String, u64)>,
) -> Result<Json<Map<String, Value>>, StatusCode> {
    let store = db.read().await;
    store
        .saved_orders
        .get(&(account_id, order_id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn replace_saved_order(
    State(db): State<Db>,
    Path((account_id, order_id)): Path<(String, u64)>,
    Json(mut order): Json<Map<String, Value>>,
) -> StatusCode {
    let mut store = db.write().await;
    match store.saved_orders.get_mut(&(account_id, order_id)) {
        Some(existing) => {
            order.insert("savedOrderId".to_string(), json!(order_id));
            *existing = order;
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn delete_saved_order(
    State(db): State<Db>,
    Path((account_id, order_id)): Path<(String, u64)>,
) -> StatusCode {
    let mut store = db.write().await;
    store
        .saved_orders
        .remove(&(account_id, order_id))
        .map(|_| StatusCode::NO_CONTENT)
        .unwrap_or(StatusCode::NOT_FOUND)
}

async fn echo(
    method: Method,
    uri: Uri,
    Query(query): Query<BTreeMap<String, String>>,
    body: String,
) -> (StatusCode, Json<Value>) {
    let path = uri.path().to_string();
    if requires_api_key(&path) && !query.contains_key("apikey") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "apikey is required"})),
        );
    }

    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    tracing::debug!(%method, %path, "echo");
    (
        StatusCode::OK,
        Json(json!({
            "method": method.as_str(),
            "path": path,
            "query": query,
            "body": body,
        })),
    )
}

fn requires_api_key(path: &str) -> bool {
    path.starts_with("/v1/marketdata") || path.starts_with("/v1/instruments")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_data_and_instruments_require_api_key() {
        assert!(requires_api_key("/v1/marketdata/quotes"));
        assert!(requires_api_key("/v1/instruments/00123"));
        assert!(!requires_api_key("/v1/accounts/1/orders"));
        assert!(!requires_api_key("/v1/orders"));
    }

    #[test]
    fn store_starts_empty() {
        let store = Store::default();
        assert_eq!(store.next_id, 0);
        assert!(store.saved_orders.is_empty());
    }
}
