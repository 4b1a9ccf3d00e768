//! Client core for the expense tracker service.
//!
//! # Overview
//! Signs a user in, keeps the bearer token in an explicitly owned
//! [`Session`], and mirrors the user's expense collection through a
//! [`Synchronizer`]. All business logic lives on the server; this crate
//! validates input shape, issues REST calls and holds the two pieces of
//! client state.
//!
//! # Design
//! - `ExpenseClient` is a stateless codec: `build_*` produces plain-data
//!   requests, `parse_*` consumes plain-data responses (host-does-IO).
//! - `Transport` is the only seam that performs I/O; `ReqwestTransport` is the
//!   production implementation.
//! - Protected operations check the session before building a request and
//!   never touch the network without a token.
//! - Mutations do not refresh the mirror; callers call `refresh` explicitly.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod summary;
pub mod sync;
pub mod transport;
pub mod types;
pub mod validation;

pub use client::ExpenseClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{Session, SessionManager};
pub use summary::Summary;
pub use sync::Synchronizer;
pub use transport::{ReqwestTransport, Transport, TransportError};
pub use types::{Category, ExpenseCollection, ExpenseForm, ExpenseInput, ExpenseRecord};
pub use validation::ValidationError;
