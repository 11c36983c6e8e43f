use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use subtle::ConstantTimeEq;

use super::AppState;

/// Basic-auth credentials guarding the private endpoints.
#[derive(Clone)]
pub struct Credentials {
    user: String,
    password: String,
    realm: String,
}

impl Credentials {
    pub fn new(user: &str, password: &str, realm: &str) -> Self {
        Self {
            user: user.to_string(),
            password: password.to_string(),
            realm: realm.to_string(),
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Both halves are always compared so timing does not reveal which one
    /// was wrong.
    pub fn verify(&self, user: &str, password: &str) -> bool {
        let user_ok = user.as_bytes().ct_eq(self.user.as_bytes());
        let password_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        (user_ok & password_ok).into()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("realm", &self.realm)
            .finish_non_exhaustive()
    }
}

pub(crate) async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = basic_credentials(request.headers())
        .is_some_and(|(user, password)| state.credentials.verify(&user, &password));
    if !authorized {
        log::warn!("rejected unauthenticated request to {}", request.uri().path());
        return unauthorized(state.credentials.realm());
    }
    next.run(request).await
}

fn unauthorized(realm: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, format!("Basic realm=\"{realm}\""))],
        "Unauthorised.\n",
    )
        .into_response()
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}
