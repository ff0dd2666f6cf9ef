//! Todo list task.
//!
//! # Invariants
//! - `completed_at` is `Some` if and only if `done` is true.

use super::ModelValidationError;
use crate::remote::DocumentId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: DocumentId,
    pub text: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Sets the completion flag, stamping or clearing `completed_at`.
    pub fn set_done(&mut self, done: bool, now: DateTime<Utc>) {
        self.done = done;
        self.completed_at = completion_stamp(done, now);
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.done != self.completed_at.is_some() {
            return Err(ModelValidationError::CompletionMismatch { done: self.done });
        }
        Ok(())
    }
}

/// Validated input for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub text: String,
}

/// Full replacement of a task's editable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    pub text: String,
    pub done: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn new(text: impl Into<String>, done: bool, now: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            done,
            completed_at: completion_stamp(done, now),
        }
    }
}

/// Completion timestamp matching a `done` flag.
pub fn completion_stamp(done: bool, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    done.then_some(now)
}
