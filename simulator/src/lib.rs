use axum::{
    extract::{rejection::JsonRejection, Path, State as AxumState},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use commonware_cryptography::{Hasher, Sha256};
use commonware_utils::hex;
use houseedge_types::{
    api::{MAX_EMAIL_LENGTH, MIN_PASSWORD_LENGTH},
    Credentials, ErrorResponse, LedgerRecord, Session, UserId,
};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("Invalid or expired session")]
    Unauthorized,
    #[error("Session does not belong to this user")]
    Forbidden,
    #[error("No ledger stored for this user")]
    NotFound,
    #[error("User already registered")]
    EmailTaken,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::EmailTaken => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

struct Account {
    user_id: UserId,
    email: String,
    salt: String,
    password_digest: String,
}

#[derive(Default)]
pub struct State {
    /// Accounts keyed by normalized email
    accounts: HashMap<String, Account>,
    /// Access token -> account email
    tokens: HashMap<String, String>,
    ledgers: HashMap<UserId, LedgerRecord>,
}

/// In-memory auth and ledger backend.
#[derive(Clone, Default)]
pub struct Simulator {
    state: Arc<RwLock<State>>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn digest_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex(hasher.finalize().as_ref())
}

fn validate_credentials(credentials: &Credentials) -> Result<String, ApiError> {
    let email = normalize_email(&credentials.email);
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH || !email.contains('@') {
        return Err(ApiError::InvalidRequest(
            "Unable to validate email address: invalid format".to_string(),
        ));
    }
    if credentials.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::InvalidRequest(format!(
            "Password should be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(email)
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue_session(state: &mut State, email: &str) -> Option<Session> {
        let account = state.accounts.get(email)?;
        let session = Session {
            user_id: account.user_id.clone(),
            email: account.email.clone(),
            access_token: Uuid::new_v4().simple().to_string(),
        };
        state
            .tokens
            .insert(session.access_token.clone(), email.to_string());
        Some(session)
    }

    pub fn sign_up(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let email = validate_credentials(credentials)?;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.accounts.contains_key(&email) {
            return Err(ApiError::EmailTaken);
        }

        let salt = Uuid::new_v4().simple().to_string();
        let account = Account {
            user_id: Uuid::new_v4().to_string(),
            email: email.clone(),
            password_digest: digest_password(&salt, &credentials.password),
            salt,
        };
        info!(user_id = %account.user_id, "account created");
        state.accounts.insert(email.clone(), account);
        Self::issue_session(&mut state, &email).ok_or(ApiError::InvalidCredentials)
    }

    pub fn sign_in(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let email = normalize_email(&credentials.email);
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let account = state
            .accounts
            .get(&email)
            .ok_or(ApiError::InvalidCredentials)?;
        if digest_password(&account.salt, &credentials.password) != account.password_digest {
            debug!("rejected sign-in");
            return Err(ApiError::InvalidCredentials);
        }
        Self::issue_session(&mut state, &email).ok_or(ApiError::InvalidCredentials)
    }

    pub fn sign_out(&self, token: &str) -> Result<(), ApiError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state
            .tokens
            .remove(token)
            .map(|_| ())
            .ok_or(ApiError::Unauthorized)
    }

    /// Resolve an access token to its session.
    pub fn session(&self, token: &str) -> Result<Session, ApiError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let account = state
            .tokens
            .get(token)
            .and_then(|email| state.accounts.get(email))
            .ok_or(ApiError::Unauthorized)?;
        Ok(Session {
            user_id: account.user_id.clone(),
            email: account.email.clone(),
            access_token: token.to_string(),
        })
    }

    /// Require that `token` is a live session for `user_id`.
    fn owner(&self, token: &str, user_id: &str) -> Result<(), ApiError> {
        if self.session(token)?.user_id != user_id {
            return Err(ApiError::Forbidden);
        }
        Ok(())
    }

    /// Store `record` for `user_id`, replacing any previous one.
    pub fn upsert_ledger(
        &self,
        token: &str,
        user_id: &str,
        record: LedgerRecord,
    ) -> Result<LedgerRecord, ApiError> {
        self.owner(token, user_id)?;
        if record.user_id != user_id {
            return Err(ApiError::InvalidRequest(
                "user_id does not match the request path".to_string(),
            ));
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.ledgers.insert(user_id.to_string(), record.clone());
        debug!(
            user_id,
            virtual_balance = record.virtual_balance,
            total_lost = record.total_lost,
            "ledger stored"
        );
        Ok(record)
    }

    /// Read the record stored for `user_id` on behalf of its owner.
    pub fn fetch_ledger(&self, token: &str, user_id: &str) -> Result<LedgerRecord, ApiError> {
        self.owner(token, user_id)?;
        self.ledger(user_id).ok_or(ApiError::NotFound)
    }

    pub fn ledger(&self, user_id: &str) -> Option<LedgerRecord> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.ledgers.get(user_id).cloned()
    }
}

pub struct Api {
    simulator: Arc<Simulator>,
}

impl Api {
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self { simulator }
    }

    pub fn router(&self) -> Router {
        // Configure CORS
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

        Router::new()
            .route("/auth/signup", post(sign_up))
            .route("/auth/signin", post(sign_in))
            .route("/auth/signout", post(sign_out))
            .route("/auth/session", get(current_session))
            .route("/ledger/:user_id", get(get_ledger).put(put_ledger))
            .layer(cors)
            .with_state(self.simulator.clone())
    }
}

fn bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)
}

async fn sign_up(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Session>, ApiError> {
    let Json(credentials) = body?;
    simulator.sign_up(&credentials).map(Json)
}

async fn sign_in(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Session>, ApiError> {
    let Json(credentials) = body?;
    simulator.sign_in(&credentials).map(Json)
}

async fn sign_out(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    simulator.sign_out(bearer(&headers)?)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn current_session(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    headers: HeaderMap,
) -> Result<Json<Session>, ApiError> {
    simulator.session(bearer(&headers)?).map(Json)
}

async fn get_ledger(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<LedgerRecord>, ApiError> {
    simulator.fetch_ledger(bearer(&headers)?, &user_id).map(Json)
}

async fn put_ledger(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    body: Result<Json<LedgerRecord>, JsonRejection>,
) -> Result<Json<LedgerRecord>, ApiError> {
    let token = bearer(&headers)?;
    let Json(record) = body?;
    simulator.upsert_ledger(token, &user_id, record).map(Json)
}
