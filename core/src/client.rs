//! Stateless HTTP request builder and response parser for the expense API.
//!
//! # Design
//! `ExpenseClient` holds only a `base_url` and carries no mutable state
//! between calls. Each API operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Protected builders take the bearer token explicitly; the
//! client never stores it.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, GENERIC_FAILURE_MESSAGE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    ErrorBody, ExpenseCollection, ExpenseInput, ExpenseRecord, SignInBody, SignInReply, SignUpBody,
};

/// Synchronous, stateless codec for the expense API.
#[derive(Debug, Clone)]
pub struct ExpenseClient {
    base_url: String,
}

impl ExpenseClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_sign_in(&self, email: &str, password: &str) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/signin", None, &SignInBody { email, password })
    }

    pub fn build_sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<HttpRequest, ApiError> {
        let body = SignUpBody {
            username,
            email,
            password,
        };
        self.json_request(HttpMethod::Post, "/auth/signup", None, &body)
    }

    pub fn build_list_expenses(&self, token: &SecretString) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/auth/expenses", self.base_url),
            headers: vec![bearer(token)],
            body: None,
        }
    }

    pub fn build_create_expense(
        &self,
        token: &SecretString,
        input: &ExpenseInput,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/expenses", Some(token), input)
    }

    pub fn build_update_expense(
        &self,
        token: &SecretString,
        id: Uuid,
        input: &ExpenseInput,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/auth/expenses/{id}"), Some(token), input)
    }

    pub fn build_delete_expense(&self, token: &SecretString, id: Uuid) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/auth/expenses/{id}", self.base_url),
            headers: vec![bearer(token)],
            body: None,
        }
    }

    /// Extract the session token. A 2xx without a non-empty token is
    /// `MissingToken`.
    pub fn parse_sign_in(&self, response: HttpResponse) -> Result<SecretString, ApiError> {
        check_status(&response)?;
        let reply: SignInReply = decode(&response)?;
        match reply.token {
            Some(token) if !token.is_empty() => Ok(SecretString::from(token)),
            _ => Err(ApiError::MissingToken),
        }
    }

    pub fn parse_sign_up(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_list_expenses(&self, response: HttpResponse) -> Result<ExpenseCollection, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    pub fn parse_create_expense(&self, response: HttpResponse) -> Result<ExpenseRecord, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    pub fn parse_update_expense(&self, response: HttpResponse) -> Result<ExpenseRecord, ApiError> {
        check_status(&response)?;
        decode(&response)
    }

    pub fn parse_delete_expense(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        route: &str,
        token: Option<&SecretString>,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut headers = vec![("content-type".to_string(), "application/json".to_string())];
        if let Some(token) = token {
            headers.push(bearer(token));
        }
        Ok(HttpRequest {
            method,
            path: format!("{}{route}", self.base_url),
            headers,
            body: Some(body),
        })
    }
}

fn bearer(token: &SecretString) -> (String, String) {
    (
        "authorization".to_string(),
        format!("Bearer {}", token.expose_secret()),
    )
}

fn decode<T: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-2xx statuses to the matching `ApiError` variant, carrying the
/// server's `message` (or `error`) field when the body has one.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = server_message(&response.body);
    Err(match response.status {
        401 => ApiError::Unauthorized { message },
        404 => ApiError::NotFound { message },
        status => ApiError::Http { status, message },
    })
}

fn server_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}
