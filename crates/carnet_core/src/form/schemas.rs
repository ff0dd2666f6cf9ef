//! Schemas of the application's forms and their typed outputs.

use super::{FieldErrors, FieldSpec, RawForm, Rule, Schema};
use crate::model::expense::{ExpenseCategory, ExpenseInput};
use crate::model::income::IncomeInput;
use crate::model::task::NewTask;
use chrono::{NaiveDate, Utc};

pub const AMOUNT: &str = "amount";
pub const DESCRIPTION: &str = "description";
pub const CATEGORY: &str = "category";
pub const DATE: &str = "date";
pub const TAX_APPLICABLE: &str = "tax_applicable";
pub const TEXT: &str = "text";
pub const NAME: &str = "name";
pub const EMAIL: &str = "email";
pub const MESSAGE: &str = "message";

/// Earliest year accepted for an expense date.
pub const EXPENSE_DATE_MIN_YEAR: i32 = 1900;

const AMOUNT_TOO_LARGE: &str = "Le montant ne peut pas dépasser 1 000 000 000 000 000.";

fn description_rule() -> Rule {
    Rule::Text {
        min: 5,
        max: Some(500),
        too_short: "La description doit contenir au moins 5 caractères.",
        too_long: "La description doit contenir moins de 500 caractères.",
    }
}

pub fn expense_schema() -> Schema {
    Schema::new()
        .field(FieldSpec::new(
            AMOUNT,
            Rule::Amount {
                invalid: "Le montant doit être un nombre valide supérieur à 0.",
                too_large: AMOUNT_TOO_LARGE,
            },
        ))
        .field(FieldSpec::new(DESCRIPTION, description_rule()))
        .field(
            FieldSpec::new(
                CATEGORY,
                Rule::OneOf {
                    options: ExpenseCategory::labels().to_vec(),
                },
            )
            .required("Veuillez sélectionner une catégorie valide."),
        )
        .field(
            FieldSpec::new(
                DATE,
                Rule::Date {
                    min_year: EXPENSE_DATE_MIN_YEAR,
                    invalid: "Veuillez sélectionner une date valide.",
                },
            )
            .required("Veuillez sélectionner une date."),
        )
        .field(FieldSpec::new(TAX_APPLICABLE, Rule::Flag))
}

pub fn income_schema() -> Schema {
    Schema::new()
        .field(FieldSpec::new(
            AMOUNT,
            Rule::Amount {
                invalid: "Le montant doit être supérieur à 0.",
                too_large: AMOUNT_TOO_LARGE,
            },
        ))
        .field(FieldSpec::new(DESCRIPTION, description_rule()))
        .field(FieldSpec::new(
            CATEGORY,
            Rule::Text {
                min: 2,
                max: None,
                too_short: "La catégorie doit contenir au moins 2 caractères.",
                too_long: "",
            },
        ))
}

pub fn task_schema() -> Schema {
    Schema::new().field(FieldSpec::new(
        TEXT,
        Rule::Text {
            min: 4,
            max: Some(100),
            too_short: "La tache doit contenir au moins 4 caractères.",
            too_long: "La tache doit contenir moins de 100 caractères.",
        },
    ))
}

pub fn contact_schema() -> Schema {
    Schema::new()
        .field(FieldSpec::new(
            NAME,
            Rule::Text {
                min: 2,
                max: Some(100),
                too_short: "Le nom doit contenir au moins 2 caractères.",
                too_long: "Le nom doit contenir moins de 100 caractères.",
            },
        ))
        .field(FieldSpec::new(
            EMAIL,
            Rule::Email {
                invalid: "Veuillez entrer une adresse e-mail valide.",
            },
        ))
        .field(FieldSpec::new(
            MESSAGE,
            Rule::Text {
                min: 10,
                max: Some(500),
                too_short: "Le message doit contenir au moins 10 caractères.",
                too_long: "Le message doit contenir moins de 500 caractères.",
            },
        ))
}

/// Validates the expense form. `today` is the latest accepted date.
pub fn expense_form(raw: &RawForm, today: NaiveDate) -> Result<ExpenseInput, FieldErrors> {
    let form = expense_schema().validate(raw, today)?;
    let category = ExpenseCategory::from_label(&form.text(CATEGORY)?).map_err(|err| {
        let mut errors = FieldErrors::default();
        errors.insert(CATEGORY, err.to_string());
        errors
    })?;

    Ok(ExpenseInput {
        amount: form.amount(AMOUNT)?,
        description: form.text(DESCRIPTION)?,
        category,
        spent_on: form.date(DATE)?,
        tax_applicable: form.flag(TAX_APPLICABLE)?,
    })
}

pub fn income_form(raw: &RawForm) -> Result<IncomeInput, FieldErrors> {
    let form = income_schema().validate(raw, Utc::now().date_naive())?;
    Ok(IncomeInput {
        amount: form.amount(AMOUNT)?,
        description: form.text(DESCRIPTION)?,
        category: form.text(CATEGORY)?,
    })
}

pub fn task_form(raw: &RawForm) -> Result<NewTask, FieldErrors> {
    let form = task_schema().validate(raw, Utc::now().date_naive())?;
    Ok(NewTask {
        text: form.text(TEXT)?,
    })
}

/// Contact request. Validated only; nothing stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub fn contact_form(raw: &RawForm) -> Result<ContactMessage, FieldErrors> {
    let form = contact_schema().validate(raw, Utc::now().date_naive())?;
    Ok(ContactMessage {
        name: form.text(NAME)?,
        email: form.text(EMAIL)?,
        message: form.text(MESSAGE)?,
    })
}
