//! Bearer-token session ownership.
//!
//! # Design
//! `Session` is a plain value owned by the caller and lent to every component
//! that needs authentication. Only `SessionManager::sign_in` fills it; only
//! `SessionManager::sign_out` and a 401 from the synchronizer empty it. The
//! token is opaque and never parsed.

use secrecy::SecretString;
use tracing::{info, warn};

use crate::client::ExpenseClient;
use crate::error::ApiError;
use crate::transport::{exchange, Transport};
use crate::validation::{validate_sign_in, validate_sign_up};

/// The current bearer token, if signed in.
#[derive(Debug, Default)]
pub struct Session {
    token: Option<SecretString>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a session from a token obtained elsewhere.
    pub fn with_token(token: SecretString) -> Self {
        Self { token: Some(token) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Every protected operation calls this before building a request.
    pub fn require_token(&self) -> Result<&SecretString, ApiError> {
        self.token.as_ref().ok_or(ApiError::Unauthenticated)
    }

    fn begin(&mut self, token: SecretString) {
        self.token = Some(token);
    }

    pub(crate) fn end(&mut self) {
        self.token = None;
    }
}

/// Sign-in, sign-up and sign-out against the auth endpoints.
#[derive(Debug, Clone)]
pub struct SessionManager<T> {
    client: ExpenseClient,
    transport: T,
}

impl<T: Transport> SessionManager<T> {
    pub fn new(client: ExpenseClient, transport: T) -> Self {
        Self { client, transport }
    }

    /// Stores the returned token in `session` only when the server sent one.
    /// On any failure `session` is left as it was.
    pub async fn sign_in(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        validate_sign_in(email, password)?;
        let request = self.client.build_sign_in(email, password)?;
        let response = exchange(&self.transport, request).await?;
        match self.client.parse_sign_in(response) {
            Ok(token) => {
                session.begin(token);
                info!("signed in");
                Ok(())
            }
            Err(error) => {
                warn!(error = %error, "sign-in rejected");
                Err(error)
            }
        }
    }

    /// Registers an account. Does not sign in.
    pub async fn sign_up(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        validate_sign_up(username, email, password)?;
        let request = self.client.build_sign_up(username, email, password)?;
        let response = exchange(&self.transport, request).await?;
        self.client
            .parse_sign_up(response)
            .inspect(|()| info!(username, "account created"))
            .inspect_err(|error| warn!(error = %error, "sign-up rejected"))
    }

    pub fn sign_out(&self, session: &mut Session) {
        if session.is_authenticated() {
            info!("signed out");
        }
        session.end();
    }
}
