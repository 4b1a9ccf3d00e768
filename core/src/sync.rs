//! Local mirror of the server-side expense collection.
//!
//! # Design
//! The mirror is only ever replaced wholesale by `refresh`. Mutations return
//! the server's answer and leave the mirror alone; the caller decides when to
//! refresh. Every protected call checks the session before building a
//! request, and a 401 from the server ends the session.
//!
//! `refresh` borrows the synchronizer mutably for its whole duration, so a
//! response is applied only if its future runs to completion. Dropping the
//! future discards the response.

use tracing::{info, warn};
use uuid::Uuid;

use crate::client::ExpenseClient;
use crate::error::ApiError;
use crate::session::Session;
use crate::summary::Summary;
use crate::transport::{exchange, Transport};
use crate::types::{ExpenseCollection, ExpenseForm, ExpenseInput, ExpenseRecord};

#[derive(Debug)]
pub struct Synchronizer<T> {
    client: ExpenseClient,
    transport: T,
    mirror: ExpenseCollection,
}

impl<T: Transport> Synchronizer<T> {
    pub fn new(client: ExpenseClient, transport: T) -> Self {
        Self {
            client,
            transport,
            mirror: ExpenseCollection::default(),
        }
    }

    /// The last successfully fetched snapshot. Empty before the first refresh.
    pub fn mirror(&self) -> &ExpenseCollection {
        &self.mirror
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.mirror)
    }

    /// Fetch the full collection and replace the mirror with it. On failure
    /// the previous mirror stays in place and the error is `FetchFailed`,
    /// except for session failures, which end the session instead.
    pub async fn refresh(&mut self, session: &mut Session) -> Result<&ExpenseCollection, ApiError> {
        let token = session.require_token()?;
        let request = self.client.build_list_expenses(token);
        let result = match exchange(&self.transport, request).await {
            Ok(response) => self.client.parse_list_expenses(response),
            Err(error) => Err(error),
        };
        match settle(session, result) {
            Ok(collection) => {
                info!(records = collection.len(), "mirror refreshed");
                self.mirror = collection;
                Ok(&self.mirror)
            }
            Err(error) => {
                let error = error.into_fetch_failure();
                warn!(error = %error, retryable = error.is_retryable(), "refresh failed; keeping previous mirror");
                Err(error)
            }
        }
    }

    pub async fn create(
        &self,
        session: &mut Session,
        input: &ExpenseInput,
    ) -> Result<ExpenseRecord, ApiError> {
        let token = session.require_token()?;
        input.validate()?;
        let request = self.client.build_create_expense(token, input)?;
        let result = match exchange(&self.transport, request).await {
            Ok(response) => self.client.parse_create_expense(response),
            Err(error) => Err(error),
        };
        settle(session, result)
            .inspect(|record| info!(id = %record.id, "expense created"))
            .inspect_err(|error| warn!(error = %error, "create failed"))
    }

    /// Full replace of `amount`, `description` and `category`.
    pub async fn update(
        &self,
        session: &mut Session,
        id: Uuid,
        input: &ExpenseInput,
    ) -> Result<ExpenseRecord, ApiError> {
        let token = session.require_token()?;
        input.validate()?;
        let request = self.client.build_update_expense(token, id, input)?;
        let result = match exchange(&self.transport, request).await {
            Ok(response) => self.client.parse_update_expense(response),
            Err(error) => Err(error),
        };
        settle(session, result)
            .inspect(|record| info!(id = %record.id, "expense updated"))
            .inspect_err(|error| warn!(%id, error = %error, "update failed"))
    }

    pub async fn delete(&self, session: &mut Session, id: Uuid) -> Result<(), ApiError> {
        let token = session.require_token()?;
        let request = self.client.build_delete_expense(token, id);
        let result = match exchange(&self.transport, request).await {
            Ok(response) => self.client.parse_delete_expense(response),
            Err(error) => Err(error),
        };
        settle(session, result)
            .inspect(|()| info!(%id, "expense deleted"))
            .inspect_err(|error| warn!(%id, error = %error, "delete failed"))
    }

    /// Parse a raw form and create from it.
    pub async fn create_from_form(
        &self,
        session: &mut Session,
        form: &ExpenseForm,
    ) -> Result<ExpenseRecord, ApiError> {
        session.require_token()?;
        let input = form.parse()?;
        self.create(session, &input).await
    }

    /// Parse a raw form and replace record `id` with it.
    pub async fn update_from_form(
        &self,
        session: &mut Session,
        id: Uuid,
        form: &ExpenseForm,
    ) -> Result<ExpenseRecord, ApiError> {
        session.require_token()?;
        let input = form.parse()?;
        self.update(session, id, &input).await
    }
}

/// Tear the session down when the server says the token is no longer valid.
fn settle<R>(session: &mut Session, result: Result<R, ApiError>) -> Result<R, ApiError> {
    if let Err(ApiError::Unauthorized { .. }) = &result {
        warn!("server rejected the session token; signing out");
        session.end();
    }
    result
}
