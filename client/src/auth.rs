use houseedge_types::Session;
use std::future::Future;
use thiserror::Error;
use tokio::sync::watch;

/// A failed auth request.
///
/// The message is meant to be shown to the player as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The backend refused the request.
    #[error("{0}")]
    Rejected(String),
    /// The backend could not be reached.
    #[error("{0}")]
    Network(String),
    /// The request needs a signed-in session.
    #[error("not signed in")]
    SignedOut,
}

/// Source of player sessions.
pub trait Authenticator: Clone + Send + Sync + 'static {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, AuthError>> + Send;

    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, AuthError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// The current session, if signed in.
    fn session(&self) -> Option<Session>;

    /// Watch session changes (sign-in, sign-up, sign-out).
    fn subscribe(&self) -> watch::Receiver<Option<Session>>;
}
