use crate::{
    auth::{AuthError, Authenticator},
    Error, Result,
};
use houseedge_execution::{LedgerStore, SyncError};
use houseedge_types::{casino::LedgerSnapshot, Credentials, ErrorResponse, LedgerRecord, Session};
use reqwest::{Client as HttpClient, StatusCode};
use std::{sync::Arc, time::Duration};
use tokio::sync::watch;
use tracing::{debug, info};
use url::Url;

/// Timeout for connections and requests
const TIMEOUT: Duration = Duration::from_secs(30);

/// Houseedge backend client.
///
/// Clones share the signed-in session.
#[derive(Clone)]
pub struct Client {
    pub base_url: Url,
    pub http_client: HttpClient,

    session: Arc<watch::Sender<Option<Session>>>,
}

/// Pull the player-facing message out of a failed response.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(body) => body.message,
        Err(_) => status.to_string(),
    }
}

fn unavailable(err: impl ToString) -> SyncError {
    SyncError::Unavailable(err.to_string())
}

impl Client {
    /// Create a new client
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidScheme(scheme.to_string())),
        }

        let http_client = HttpClient::builder()
            .timeout(TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(60)) // Keep connections alive
            .tcp_keepalive(Duration::from_secs(30)) // TCP keepalive
            .build()?;

        let (session, _) = watch::channel(None);
        Ok(Self {
            base_url,
            http_client,
            session: Arc::new(session),
        })
    }

    fn access_token(&self) -> Option<String> {
        self.session
            .borrow()
            .as_ref()
            .map(|session| session.access_token.clone())
    }

    fn set_session(&self, session: Option<Session>) {
        self.session.send_replace(session);
    }

    async fn authenticate(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> std::result::Result<Session, AuthError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| AuthError::Network(e.to_string()))?;
        debug!("Authenticating at {}", url);

        let response = self
            .http_client
            .post(url)
            .json(&Credentials::new(email, password))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(AuthError::Rejected(error_message(response).await));
        }
        let session: Session = response
            .json()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        info!(user_id = %session.user_id, "signed in");
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    /// Check the current token with the backend, dropping it if rejected.
    pub async fn refresh_session(&self) -> std::result::Result<Session, AuthError> {
        let token = self.access_token().ok_or(AuthError::SignedOut)?;
        let url = self
            .base_url
            .join("auth/session")
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        if !response.status().is_success() {
            self.set_session(None);
            return Err(AuthError::Rejected(error_message(response).await));
        }
        response
            .json()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))
    }

    fn ledger_url(&self, user_id: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("ledger/{user_id}"))?)
    }
}

impl Authenticator for Client {
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<Session, AuthError> {
        self.authenticate("auth/signin", email, password).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<Session, AuthError> {
        self.authenticate("auth/signup", email, password).await
    }

    async fn sign_out(&self) -> std::result::Result<(), AuthError> {
        let token = self.access_token().ok_or(AuthError::SignedOut)?;
        self.set_session(None);

        let url = self
            .base_url
            .join("auth/signout")
            .map_err(|e| AuthError::Network(e.to_string()))?;
        let response = self
            .http_client
            .post(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(AuthError::Rejected(error_message(response).await));
        }
        info!("signed out");
        Ok(())
    }

    fn session(&self) -> Option<Session> {
        self.session.borrow().as_ref().cloned()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}

impl LedgerStore for Client {
    async fn upsert_ledger(
        &self,
        user_id: &str,
        snapshot: LedgerSnapshot,
    ) -> std::result::Result<(), SyncError> {
        let token = self
            .access_token()
            .ok_or_else(|| SyncError::Rejected("not signed in".to_string()))?;
        let url = self.ledger_url(user_id).map_err(unavailable)?;

        let response = self
            .http_client
            .put(url)
            .bearer_auth(token)
            .json(&LedgerRecord::new(user_id, snapshot))
            .send()
            .await
            .map_err(unavailable)?;
        if !response.status().is_success() {
            return Err(SyncError::Rejected(error_message(response).await));
        }
        debug!(user_id, ?snapshot, "ledger synced");
        Ok(())
    }

    async fn fetch_ledger(
        &self,
        user_id: &str,
    ) -> std::result::Result<Option<LedgerSnapshot>, SyncError> {
        let url = self.ledger_url(user_id).map_err(unavailable)?;
        let mut request = self.http_client.get(url);
        if let Some(token) = self.access_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(unavailable)?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let record: LedgerRecord = response.json().await.map_err(unavailable)?;
                Ok(Some(record.snapshot()))
            }
            _ => Err(SyncError::Rejected(error_message(response).await)),
        }
    }
}
