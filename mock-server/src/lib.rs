use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request, State,
    },
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

pub const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=20;
pub const PASSWORD_LEN: std::ops::RangeInclusive<usize> = 8..=20;
pub const EMAIL_MAX_LEN: usize = 120;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    Groceries,
    Utilities,
    Transportation,
    Entertainment,
    Rent,
    Miscellaneous,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Expense {
    pub id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub category: Category,
}

#[derive(Deserialize)]
pub struct ExpensePayload {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub category: Category,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseListing {
    #[serde(rename = "Data")]
    pub data: Vec<Expense>,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
}

#[derive(Default, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Default, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenReply {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageReply {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
    pub message: String,
}

/// Every failure the API reports. `Display` is the `message` field.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("Username or email already exists")]
    Duplicate,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Missing authorization token")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Expense not found")]
    NotFound,

    /// A body or path segment the extractors could not decode.
    #[error("{message}")]
    Malformed { status: StatusCode, message: String },
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        ServerError::Malformed {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ServerError::Duplicate => (StatusCode::BAD_REQUEST, "duplicate_user"),
            ServerError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            ServerError::MissingToken => (StatusCode::UNAUTHORIZED, "missing_token"),
            ServerError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            ServerError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            ServerError::Malformed { status, .. } => (*status, "invalid_request"),
        };
        let body = ErrorReply {
            error: code.to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

struct User {
    id: Uuid,
    username: String,
    email: String,
    password: String,
}

struct StoredExpense {
    owner: Uuid,
    expense: Expense,
}

/// In-memory users, issued tokens and expenses. Expenses keep insertion order.
///
/// Test scaffolding only: passwords are kept in plain text and issued tokens
/// never expire, so `tokens` grows with every sign-in for the life of the
/// process.
#[derive(Default)]
pub struct Store {
    users: Vec<User>,
    tokens: HashMap<String, Uuid>,
    expenses: Vec<StoredExpense>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    router(Db::default())
}

pub fn router(db: Db) -> Router {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/auth/expenses", get(list_expenses).post(create_expense))
        .route("/auth/expenses/{id}", put(update_expense).delete(delete_expense))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// `Json<T>` that reports a bad body as a `ServerError`.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Payload(value))
    }
}

/// The `{id}` path segment of an expense route.
pub struct ExpenseId(pub Uuid);

impl<S> FromRequestParts<S> for ExpenseId
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state).await?;
        Ok(ExpenseId(id))
    }
}

/// The user a valid bearer token belongs to.
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<Db> for AuthUser {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .ok_or(ServerError::MissingToken)?;
        let store = db.read().await;
        store
            .tokens
            .get(token)
            .map(|&user_id| AuthUser { user_id })
            .ok_or(ServerError::InvalidToken)
    }
}

/// Field checks in the order the backend reports them.
pub fn validate_sign_up(input: &SignUpRequest) -> Result<(), ServerError> {
    let username = required(&input.username, "Username is required")?;
    let email = required(&input.email, "Email is required")?;
    let password = required(&input.password, "Password is required")?;

    if !USERNAME_LEN.contains(&username.chars().count()) {
        return Err(ServerError::Validation(
            "Username must be between 3 and 20 characters long",
        ));
    }
    if email.chars().count() > EMAIL_MAX_LEN {
        return Err(ServerError::Validation("Email must be 120 characters or fewer"));
    }
    if !looks_like_email(email) {
        return Err(ServerError::Validation("Invalid email address"));
    }
    if !PASSWORD_LEN.contains(&password.chars().count()) {
        return Err(ServerError::Validation(
            "Password must be between 8 and 20 characters long",
        ));
    }
    Ok(())
}

pub fn validate_expense(input: &ExpensePayload) -> Result<(), ServerError> {
    if input.amount < Decimal::ZERO {
        return Err(ServerError::Validation("Amount must not be negative"));
    }
    if input.description.trim().is_empty() {
        return Err(ServerError::Validation("Description is required"));
    }
    Ok(())
}

fn required<'a>(field: &'a Option<String>, message: &'static str) -> Result<&'a str, ServerError> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(ServerError::Validation(message))
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

async fn sign_up(
    State(db): State<Db>,
    Payload(input): Payload<SignUpRequest>,
) -> Result<(StatusCode, Json<MessageReply>), ServerError> {
    validate_sign_up(&input)?;
    let username = input.username.unwrap_or_default().trim().to_string();
    let email = input.email.unwrap_or_default().trim().to_string();
    let password = input.password.unwrap_or_default();

    let mut store = db.write().await;
    if store
        .users
        .iter()
        .any(|user| user.email == email || user.username == username)
    {
        warn!(%username, "sign-up rejected: duplicate user");
        return Err(ServerError::Duplicate);
    }
    store.users.push(User {
        id: Uuid::new_v4(),
        username: username.clone(),
        email,
        password,
    });
    info!(%username, "user created");
    Ok((
        StatusCode::CREATED,
        Json(MessageReply {
            message: "User created successfully".to_string(),
        }),
    ))
}

async fn sign_in(
    State(db): State<Db>,
    Payload(input): Payload<SignInRequest>,
) -> Result<Json<TokenReply>, ServerError> {
    let email = required(&input.email, "Email is required")?;
    let password = input
        .password
        .as_deref()
        .filter(|password| !password.is_empty())
        .ok_or(ServerError::Validation("Password is required"))?;

    let mut store = db.write().await;
    let user_id = store
        .users
        .iter()
        .find(|user| user.email == email && user.password == password)
        .map(|user| user.id)
        .ok_or(ServerError::InvalidCredentials)?;
    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), user_id);
    info!(%user_id, "user signed in");
    Ok(Json(TokenReply { token }))
}

async fn list_expenses(State(db): State<Db>, user: AuthUser) -> Json<ExpenseListing> {
    let store = db.read().await;
    let data: Vec<Expense> = store
        .expenses
        .iter()
        .filter(|stored| stored.owner == user.user_id)
        .map(|stored| stored.expense.clone())
        .collect();
    let sum = data.iter().map(|expense| expense.amount).sum();
    Json(ExpenseListing { data, sum })
}

async fn create_expense(
    State(db): State<Db>,
    user: AuthUser,
    Payload(input): Payload<ExpensePayload>,
) -> Result<(StatusCode, Json<Expense>), ServerError> {
    validate_expense(&input)?;
    let expense = Expense {
        id: Uuid::new_v4(),
        amount: input.amount,
        description: input.description,
        category: input.category,
    };
    db.write().await.expenses.push(StoredExpense {
        owner: user.user_id,
        expense: expense.clone(),
    });
    info!(id = %expense.id, "expense created");
    Ok((StatusCode::CREATED, Json(expense)))
}

async fn update_expense(
    State(db): State<Db>,
    user: AuthUser,
    ExpenseId(id): ExpenseId,
    Payload(input): Payload<ExpensePayload>,
) -> Result<Json<Expense>, ServerError> {
    validate_expense(&input)?;
    let mut store = db.write().await;
    let stored = store
        .expenses
        .iter_mut()
        .find(|stored| stored.owner == user.user_id && stored.expense.id == id)
        .ok_or(ServerError::NotFound)?;
    stored.expense.amount = input.amount;
    stored.expense.description = input.description;
    stored.expense.category = input.category;
    info!(%id, "expense updated");
    Ok(Json(stored.expense.clone()))
}

async fn delete_expense(
    State(db): State<Db>,
    user: AuthUser,
    ExpenseId(id): ExpenseId,
) -> Result<StatusCode, ServerError> {
    let mut store = db.write().await;
    let position = store
        .expenses
        .iter()
        .position(|stored| stored.owner == user.user_id && stored.expense.id == id)
        .ok_or(ServerError::NotFound)?;
    store.expenses.remove(position);
    info!(%id, "expense deleted");
    Ok(StatusCode::NO_CONTENT)
}
