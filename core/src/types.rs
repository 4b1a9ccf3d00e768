//! Domain DTOs for the expense API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! the integration tests catch any drift between the two crates. Amounts are
//! `Decimal` in memory and JSON numbers on the wire.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::ValidationError;

/// The fixed set of expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Groceries,
    Utilities,
    Transportation,
    Entertainment,
    Rent,
    Miscellaneous,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Groceries,
        Category::Utilities,
        Category::Transportation,
        Category::Entertainment,
        Category::Rent,
        Category::Miscellaneous,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Groceries => "Groceries",
            Category::Utilities => "Utilities",
            Category::Transportation => "Transportation",
            Category::Entertainment => "Entertainment",
            Category::Rent => "Rent",
            Category::Miscellaneous => "Miscellaneous",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::CategoryRequired);
        }
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == trimmed)
            .ok_or_else(|| ValidationError::UnknownCategory(trimmed.to_string()))
    }
}

/// A single expense record returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpenseRecord {
    pub id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub category: Category,
}

/// Payload for creating an expense or fully replacing an existing one.
///
/// `amount` travels as a JSON number, so it is rounded to the nearest `f64`
/// when sent. Amounts with more than 15 significant digits do not survive
/// the trip exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpenseInput {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub category: Category,
}

impl ExpenseInput {
    /// Check the invariants the server expects before submission.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::DescriptionRequired);
        }
        Ok(())
    }
}

/// Raw, unparsed expense fields as typed into a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseForm {
    pub amount: String,
    pub description: String,
    pub category: String,
}

impl ExpenseForm {
    /// Pre-fill a form from an existing record, for editing.
    pub fn from_record(record: &ExpenseRecord) -> Self {
        Self {
            amount: record.amount.to_string(),
            description: record.description.clone(),
            category: record.category.as_str().to_string(),
        }
    }

    /// Parse and validate into a submittable `ExpenseInput`.
    pub fn parse(&self) -> Result<ExpenseInput, ValidationError> {
        let raw_amount = self.amount.trim();
        if raw_amount.is_empty() {
            return Err(ValidationError::AmountRequired);
        }
        let amount = Decimal::from_str(raw_amount)
            .map_err(|_| ValidationError::AmountNotNumeric(raw_amount.to_string()))?;
        let input = ExpenseInput {
            amount,
            description: self.description.trim().to_string(),
            category: self.category.parse()?,
        };
        input.validate()?;
        Ok(input)
    }
}

/// The authenticated listing: records plus the server-computed total.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpenseCollection {
    #[serde(rename = "Data")]
    pub records: Vec<ExpenseRecord>,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
}

impl ExpenseCollection {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&ExpenseRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExpenseRecord> {
        self.records.iter()
    }
}

/// Sign-in request body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SignInBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Sign-up request body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct SignUpBody<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Sign-in response body. `token` is optional so a malformed success can be
/// told apart from a decode failure.
#[derive(Debug, Deserialize)]
pub(crate) struct SignInReply {
    #[serde(default)]
    pub token: Option<String>,
}

/// Error payload shape shared by every endpoint. Either field may be absent.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
