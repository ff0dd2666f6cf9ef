//! Core of the Carnet bookkeeping notebook: todo list, expenses with VAT
//! and incomes, mirrored from a document store.
//! Views and front ends only read store state and call store operations.

pub mod config;
pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod remote;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use form::{
    contact_form, expense_form, income_form, task_form, ContactMessage, FieldErrors, RawForm,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::expense::{Expense, ExpenseCategory, ExpenseInput};
pub use model::income::{Income, IncomeInput};
pub use model::task::{NewTask, Task, TaskPatch};
pub use model::ModelValidationError;
pub use remote::{CollectionStore, DocumentId, RemoteError, RemoteResult, SqliteCollectionStore};
pub use store::{
    EntityStore, ExpenseStore, IncomeStore, StoreError, StoreResult, SubscriptionHandle, TaskStore,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
