use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// A stored item: any JSON object, always carrying a string `id`.
pub type Item = Map<String, Value>;

/// resource name → item id → item.
pub type Db = Arc<RwLock<HashMap<String, HashMap<String, Item>>>>;

/// Routes accept paths with and without the trailing slash the builder
/// appends after named segments.
pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/{resource}", get(list_items).post(create_item))
        .route("/{resource}/", get(list_items).post(create_item))
        .route(
            "/{resource}/{id}",
            get(get_item).put(replace_item).patch(patch_item).delete(delete_item),
        )
        .route(
            "/{resource}/{id}/",
            get(get_item).put(replace_item).patch(patch_item).delete(delete_item),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Lists items; every query parameter filters on string equality of the
/// same-named field.
async fn list_items(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Query(filter): Query<HashMap<String, String>>,
) -> Json<Vec<Item>> {
    let db = db.read().await;
    let mut items: Vec<Item> = db
        .get(&resource)
        .map(|items| {
            items
                .values()
                .filter(|item| matches_filter(item, &filter))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    items.sort_by(|a, b| id_of(a).cmp(id_of(b)));
    Json(items)
}

async fn create_item(
    State(db): State<Db>,
    Path(resource): Path<String>,
    Json(input): Json<Value>,
) -> Result<(StatusCode, Json<Item>), StatusCode> {
    let Value::Object(mut item) = input else {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    };
    let id = Uuid::new_v4().to_string();
    item.insert("id".to_string(), Value::String(id.clone()));
    tracing::debug!(%resource, %id, "created item");
    db.write().await.entry(resource).or_default().insert(id, item.clone());
    Ok((StatusCode::CREATED, Json(item)))
}

async fn get_item(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<Item>, StatusCode> {
    let db = db.read().await;
    db.get(&resource)
        .and_then(|items| items.get(&id))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn replace_item(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
    Json(input): Json<Value>,
) -> Result<Json<Item>, StatusCode> {
    let Value::Object(mut replacement) = input else {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    };
    let mut db = db.write().await;
    let item = db
        .get_mut(&resource)
        .and_then(|items| items.get_mut(&id))
        .ok_or(StatusCode::NOT_FOUND)?;
    replacement.insert("id".to_string(), Value::String(id));
    *item = replacement;
    Ok(Json(item.clone()))
}

async fn patch_item(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
    Json(input): Json<Value>,
) -> Result<Json<Item>, StatusCode> {
    let Value::Object(changes) = input else {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    };
    let mut db = db.write().await;
    let item = db
        .get_mut(&resource)
        .and_then(|items| items.get_mut(&id))
        .ok_or(StatusCode::NOT_FOUND)?;
    for (key, value) in changes {
        if key != "id" {
            item.insert(key, value);
        }
    }
    Ok(Json(item.clone()))
}

async fn delete_item(
    State(db): State<Db>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<StatusCode, StatusCode> {
    let mut db = db.write().await;
    db.get_mut(&resource)
        .and_then(|items| items.remove(&id))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

fn id_of(item: &Item) -> &str {
    item.get("id").and_then(Value::as_str).unwrap_or_default()
}

fn matches_filter(item: &Item, filter: &HashMap<String, String>) -> bool {
    filter.iter().all(|(key, expected)| match item.get(key) {
        Some(Value::String(s)) => s == expected,
        Some(other) => other.to_string() == *expected,
        None => false,
    })
}
