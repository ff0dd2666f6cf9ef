//! Domain records mirrored by the entity stores.
//!
//! # Responsibility
//! - Define tasks, expenses and incomes with their derived values.
//! - Check record-level invariants shared by decode and write paths.
//!
//! # Invariants
//! - Every record carries a store-assigned `DocumentId`.
//! - Amounts are positive decimals no larger than `expense::MAX_AMOUNT`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod expense;
pub mod income;
pub mod task;

/// Broken record-level invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// `done` and `completed_at` disagree.
    CompletionMismatch { done: bool },
    NonPositiveAmount(String),
    AmountTooLarge(String),
    UnknownCategory(String),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CompletionMismatch { done: true } => {
                write!(f, "completed task has no completion timestamp")
            }
            Self::CompletionMismatch { done: false } => {
                write!(f, "open task carries a completion timestamp")
            }
            Self::NonPositiveAmount(amount) => write!(f, "amount must be positive, got {amount}"),
            Self::AmountTooLarge(amount) => {
                write!(f, "amount exceeds the accepted ceiling, got {amount}")
            }
            Self::UnknownCategory(value) => write!(f, "unknown expense category `{value}`"),
        }
    }
}

impl Error for ModelValidationError {}
