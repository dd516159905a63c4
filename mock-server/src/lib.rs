use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const PAGE_SIZE: usize = 10;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub current_time: String,
    pub is_deleted: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecord {
    pub name: String,
    pub email: String,
    pub current_time: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecord {
    pub name: String,
    pub email: String,
    pub current_time: String,
    #[serde(default)]
    pub is_deleted: bool,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<usize>,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub show_deleted: bool,
}

#[derive(Debug, Default)]
pub struct Records {
    next_id: i64,
    rows: BTreeMap<i64, Record>,
}

pub type Db = Arc<RwLock<Records>>;

pub fn app() -> Router {
    Router::new()
        .route("/records", get(list_records).post(create_record))
        .route("/records/{id}", put(update_record).delete(delete_record))
        .with_state(Db::default())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_records(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Record>>, StatusCode> {
    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(StatusCode::BAD_REQUEST);
    }
    let include_deleted = params.is_deleted || params.show_deleted;
    let needle = params.search.to_lowercase();

    let records = db.read().await;
    let matching = records
        .rows
        .values()
        .filter(|r| include_deleted || !r.is_deleted)
        .filter(|r| {
            needle.is_empty()
                || r.name.to_lowercase().contains(&needle)
                || r.email.to_lowercase().contains(&needle)
        })
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .cloned()
        .collect();
    Ok(Json(matching))
}

async fn create_record(
    State(db): State<Db>,
    Json(input): Json<CreateRecord>,
) -> (StatusCode, Json<Record>) {
    let mut records = db.write().await;
    records.next_id += 1;
    let record = Record {
        id: records.next_id,
        name: input.name,
        email: input.email,
        current_time: input.current_time,
        is_deleted: false,
    };
    records.rows.insert(record.id, record.clone());
    tracing::debug!(id = record.id, "created record");
    (StatusCode::CREATED, Json(record))
}

async fn update_record(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateRecord>,
) -> Result<Json<Record>, StatusCode> {
    let mut records = db.write().await;
    let record = records.rows.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    record.name = input.name;
    record.email = input.email;
    record.current_time = input.current_time;
    record.is_deleted = input.is_deleted;
    Ok(Json(record.clone()))
}

/// Soft delete: the row stays and is only hidden from default listings.
async fn delete_record(State(db): State<Db>, Path(id): Path<i64>) -> StatusCode {
    let mut records = db.write().await;
    match records.rows.get_mut(&id) {
        Some(record) => {
            record.is_deleted = true;
            tracing::debug!(id, "soft-deleted record");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}
