//! libris HTTP server: REST adapter over the catalog store.
//!
//! Routes:
//!
//! - `GET    /health` — server status
//! - `GET    /books` — filtered, paginated listing
//! - `POST   /books` — create (store assigns the id)
//! - `GET    /books/filter` — date-range query, date-sorted
//! - `GET    /books/{id}` — fetch one record
//! - `PUT    /books/{id}` — full upsert keyed by the path id
//! - `PATCH  /books/{id}` — partial update
//! - `DELETE /books/{id}` — remove
//!
//! Error mapping: not-found → 404, validation → 400, catalog/file errors
//! → 500. The store owns all state; handlers only translate.
//!
//! Build and run: `cargo run --features server --bin libris-server`

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use libris::config::ServiceConfig;
use libris::error::StoreError;
use libris::query::{BookFilter, SortOrder};
use libris::record::Book;
use libris::store::{BookPatch, CatalogStore, NewBook, UpsertOutcome};

// ── Server state ──────────────────────────────────────────────────────────

struct ServerState {
    store: CatalogStore,
    config: ServiceConfig,
}

// ── Wire types ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ListParams {
    page: Option<usize>,
    #[serde(rename = "pageSize")]
    page_size: Option<usize>,
    title: Option<String>,
    authors: Option<String>,
    category: Option<String>,
    publisher: Option<String>,
    price: Option<String>,
    #[serde(rename = "publicationDate")]
    publication_date: Option<String>,
    #[serde(rename = "languageCode")]
    language_code: Option<String>,
    isbn: Option<String>,
}

#[derive(Serialize)]
struct ListResponse {
    total: usize,
    page: usize,
    #[serde(rename = "pageSize")]
    page_size: usize,
    books: Vec<Book>,
}

#[derive(Deserialize)]
struct RangeParams {
    #[serde(rename = "startDate")]
    start_date: String,
    #[serde(rename = "endDate")]
    end_date: String,
    #[serde(rename = "sortOrder", default)]
    sort_order: Option<String>,
}

type ErrorResponse = (StatusCode, String);

fn store_error(e: StoreError) -> ErrorResponse {
    let status = match &e {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Validation { .. } => StatusCode::BAD_REQUEST,
        StoreError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, format!("{e}"))
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_books(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ErrorResponse> {
    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(state.config.default_page_size);
    let filter = BookFilter {
        title: params.title,
        authors: params.authors,
        category: params.category,
        publisher: params.publisher,
        price: params.price,
        publication_date: params.publication_date,
        language_code: params.language_code,
        isbn: params.isbn,
    };

    let (books, total) = state
        .store
        .list(&filter, page, page_size)
        .map_err(store_error)?;
    Ok(Json(ListResponse {
        total,
        page,
        page_size,
        books,
    }))
}

async fn create_book(
    State(state): State<Arc<ServerState>>,
    Json(input): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>), ErrorResponse> {
    let book = state.store.create(input).map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn get_book(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ErrorResponse> {
    let book = state.store.get(&id).map_err(store_error)?;
    Ok(Json(book))
}

async fn put_book(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(input): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>), ErrorResponse> {
    let (book, outcome) = state.store.replace(&id, input).map_err(store_error)?;
    let status = match outcome {
        UpsertOutcome::Created => StatusCode::CREATED,
        UpsertOutcome::Replaced => StatusCode::OK,
    };
    Ok((status, Json(book)))
}

async fn patch_book(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(patch): Json<BookPatch>,
) -> Result<Json<Book>, ErrorResponse> {
    let book = state.store.update(&id, &patch).map_err(store_error)?;
    Ok(Json(book))
}

async fn delete_book(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ErrorResponse> {
    state.store.delete(&id).map_err(store_error)?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

async fn filter_books(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<RangeParams>,
) -> Result<Json<Vec<Book>>, ErrorResponse> {
    let order = match params.sort_order.as_deref() {
        None => SortOrder::Ascending,
        Some(raw) => SortOrder::parse(raw).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                format!("sortOrder must be ASC or DESC, got \"{raw}\""),
            )
        })?,
    };
    let books = state
        .store
        .range_query(&params.start_date, &params.end_date, order)
        .map_err(store_error)?;
    Ok(Json(books))
}

// ── Main ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bind = std::env::var("LIBRIS_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("LIBRIS_PORT").unwrap_or_else(|_| "8300".to_string());
    let addr = format!("{bind}:{port}");

    let config_path = std::env::var("LIBRIS_CONFIG").ok().map(PathBuf::from);
    let mut config = ServiceConfig::load_or_default(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::error!("failed to load config: {e}");
        std::process::exit(1);
    });
    if let Ok(catalog) = std::env::var("LIBRIS_CATALOG") {
        config.catalog_path = PathBuf::from(catalog);
    }

    let store = CatalogStore::open(&config.catalog_path).unwrap_or_else(|e| {
        tracing::error!("failed to open catalog: {e}");
        std::process::exit(1);
    });

    let state = Arc::new(ServerState { store, config });

    let app = Router::new()
        // Health.
        .route("/health", get(health))
        // Collection.
        .route("/books", get(list_books).post(create_book))
        // Date-range query. Registered before the id route so "filter"
        // is not captured as an id.
        .route("/books/filter", get(filter_books))
        // Single record.
        .route(
            "/books/{id}",
            get(get_book)
                .put(put_book)
                .patch(patch_book)
                .delete(delete_book),
        )
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("libris server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
