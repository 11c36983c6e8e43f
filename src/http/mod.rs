//! HTTP front end for the message store.
//!
//! | Method | Path               | Auth  |
//! |--------|--------------------|-------|
//! | POST   | `/public/message`  | none  |
//! | PUT    | `/private/message` | basic |
//! | GET    | `/private/message` | basic |
//! | GET    | `/private/dump`    | basic |
//!
//! Request bodies are JSON and are read raw, so a GET carrying a body without
//! a content type is accepted.

mod auth;
mod error;
mod handlers;

use std::future::Future;
use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::store::MessageStore;

pub use auth::Credentials;
pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MessageStore>,
    pub credentials: Arc<Credentials>,
}

impl AppState {
    pub fn new(store: Arc<MessageStore>, credentials: Credentials) -> Self {
        Self {
            store,
            credentials: Arc::new(credentials),
        }
    }

    pub fn from_config(store: Arc<MessageStore>, config: &ServerConfig) -> Self {
        Self::new(
            store,
            Credentials::new(&config.admin_user, &config.admin_password, &config.realm),
        )
    }
}

pub fn router(state: AppState) -> Router {
    let private = Router::new()
        .route(
            "/private/message",
            get(handlers::get_message).put(handlers::put_message),
        )
        .route("/private/dump", get(handlers::get_dump))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ));

    Router::new()
        .route("/public/message", post(handlers::post_message))
        .merge(private)
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
}
