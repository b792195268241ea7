//! REST API over the grid store.
//!
//! Serves the live grid snapshot, engine CRUD, the suggestion lifecycle,
//! dispatch instructions, and the solar economic impact. Enabled by the
//! `api` cargo feature.

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::routing::{get, patch, post};

use crate::store::MemStore;

/// Application state shared across request handlers.
///
/// Unlike a read-only results dump, the store is mutated by apply/advance
/// handlers, so it sits behind a mutex.
pub struct AppState {
    store: Mutex<MemStore>,
    /// Fuel price used for the impact endpoint.
    pub fuel_price: f64,
}

impl AppState {
    /// Wraps a populated store for serving.
    pub fn new(store: MemStore, fuel_price: f64) -> Self {
        Self {
            store: Mutex::new(store),
            fuel_price,
        }
    }

    /// Locks the store, recovering from a poisoned lock.
    fn store(&self) -> MutexGuard<'_, MemStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route(
            "/engines",
            get(handlers::list_engines).post(handlers::create_engine),
        )
        .route(
            "/engines/{id}",
            get(handlers::get_engine)
                .patch(handlers::update_engine)
                .delete(handlers::delete_engine),
        )
        .route("/engines/{id}/toggle", post(handlers::toggle_engine))
        .route("/solar/{id}", patch(handlers::set_solar))
        .route("/consumption/{id}", patch(handlers::set_consumption))
        .route("/suggestions", get(handlers::list_suggestions))
        .route("/suggestions/generate", post(handlers::generate))
        .route("/suggestions/{id}/apply", post(handlers::apply_suggestion))
        .route("/instructions", get(handlers::get_instructions))
        .route("/impact", get(handlers::get_impact))
        .route("/clock/advance", post(handlers::advance_clock))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
