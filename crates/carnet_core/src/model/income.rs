//! Income record.

use super::expense::check_amount;
use super::ModelValidationError;
use crate::remote::DocumentId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Income {
    pub id: DocumentId,
    pub amount: Decimal,
    pub description: String,
    /// Free text, unlike expense categories.
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// Validated income fields, used both to create and to edit an income.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeInput {
    pub amount: Decimal,
    pub description: String,
    pub category: String,
}

impl Income {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_amount(self.amount)
    }
}
