use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::message::{Message, WireMessage};
use crate::store::MessageStore;

/// Body of a PUT: the id to update and its replacement text.
#[derive(Debug, Deserialize)]
struct TextUpdate {
    #[serde(default)]
    id: String,
    #[serde(default)]
    text: String,
}

/// Body of a GET for a single message.
#[derive(Debug, Deserialize)]
struct MessageKey {
    #[serde(default)]
    id: String,
}

/// POST /public/message: create or replace a message.
pub(crate) async fn post_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let wire: WireMessage = decode_body(&body)?;
    if wire.id.is_empty() || wire.text.is_empty() {
        return Err(ApiError::BadRequest("no id or text in request".to_string()));
    }
    let message =
        Message::try_from(wire).map_err(|err| ApiError::BadRequest(err.to_string()))?;
    write_blocking(&state, move |store| store.insert(message)).await?;
    Ok(StatusCode::OK)
}

/// PUT /private/message: replace the text of an existing message.
pub(crate) async fn put_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let update: TextUpdate = decode_body(&body)?;
    if update.id.is_empty() || update.text.is_empty() {
        return Err(ApiError::BadRequest("no id or text in request".to_string()));
    }
    // Existence is checked here; the store itself only upserts.
    write_blocking(&state, move |store| {
        let mut message = store.fetch_by_id(&update.id)?;
        message.text = update.text;
        store.insert(message)
    })
    .await?;
    Ok(StatusCode::OK)
}

/// GET /private/message: fetch one message by id.
pub(crate) async fn get_message(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let key: MessageKey = decode_body(&body)?;
    if key.id.is_empty() {
        return Err(ApiError::BadRequest("no id in request".to_string()));
    }
    let message = state.store.fetch_by_id(&key.id)?;
    json_response(&message)
}

/// GET /private/dump: every message, most recent first.
pub(crate) async fn get_dump(State(state): State<AppState>) -> Result<Response, ApiError> {
    let messages = state.store.fetch_anti_chrono();
    json_response(&messages)
}

/// Run a store write on the blocking pool; writers wait on a std mutex.
async fn write_blocking<F>(state: &AppState, op: F) -> Result<(), ApiError>
where
    F: FnOnce(&MessageStore) -> crate::error::Result<()> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || op(&store)).await??;
    Ok(())
}

fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("request had no body".to_string()));
    }
    serde_json::from_slice(body).map_err(|err| ApiError::BadRequest(err.to_string()))
}

fn json_response<T: Serialize>(value: &T) -> Result<Response, ApiError> {
    let body = to_pretty_json(value)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Pretty JSON with four-space indentation.
fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error as StoreError;
    use crate::http::Credentials;

    fn state_with(messages: Vec<Message>) -> AppState {
        let store = MessageStore::new();
        store.insert_batch(messages).unwrap();
        AppState::new(Arc::new(store), Credentials::new("admin", "pw", "realm"))
    }

    #[tokio::test]
    async fn unknown_id_surfaces_store_not_found() {
        let state = state_with(Vec::new());
        let err = get_message(State(state.clone()), Bytes::from_static(br#"{"id":"ghost"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Store(StoreError::NotFound(ref id)) if id == "ghost"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = put_message(
            State(state.clone()),
            Bytes::from_static(br#"{"id":"ghost","text":"boo"}"#),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(!state.store.contains("ghost"));
    }

    #[tokio::test]
    async fn store_failures_other_than_not_found_are_server_errors() {
        let state = state_with(Vec::new());
        let err = write_blocking(&state, |_| Err(StoreError::Index("time index missing")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Store(StoreError::Index(_))));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn put_runs_update_on_blocking_pool() {
        let state = state_with(vec![Message::new("a", "Ada", "ada@x", "old", 10, 3600)]);
        let status = put_message(
            State(state.clone()),
            Bytes::from_static(br#"{"id":"a","text":"new"}"#),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::OK);
        let stored = state.store.fetch_by_id("a").unwrap();
        assert_eq!(stored.text, "new");
        assert_eq!((stored.name.as_str(), stored.time, stored.tz_offset), ("Ada", 10, 3600));
    }

    #[test]
    fn pretty_json_uses_four_spaces() {
        let message = Message::new("a", "n", "e", "t", 0, 0);
        let text = String::from_utf8(to_pretty_json(&message).unwrap()).unwrap();
        assert!(text.starts_with("{\n    \"id\": \"a\","));
        assert!(text.contains("\"time\": \"1970-01-01T00:00:00+00:00\""));
    }

    #[test]
    fn empty_body_is_bad_request() {
        let err = decode_body::<MessageKey>(&Bytes::new()).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let err = decode_body::<MessageKey>(&Bytes::from_static(br#"{""}"#)).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
