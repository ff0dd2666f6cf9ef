//! Declarative validation of raw form input.
//!
//! # Responsibility
//! - Coerce text input into typed values (decimal, date, flag).
//! - Enforce length, range and membership rules per field.
//! - Report every failing field at once with a user-facing message.
//!
//! # Invariants
//! - Validation is pure: the same input and day give the same result.
//! - Text length bounds are `[min, max)` in characters, after trimming.

use crate::model::expense::MAX_AMOUNT;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub mod schemas;

pub use schemas::{contact_form, expense_form, income_form, task_form, ContactMessage};

const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Raw submitted form: every field as text, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawForm {
    values: BTreeMap<String, String>,
}

impl RawForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawForm {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Self::new();
        for (name, value) in iter {
            form.set(name, value);
        }
        form
    }
}

/// Field name → message for every field that failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl Error for FieldErrors {}

/// Coercion and constraint applied to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Decimal in `(0, MAX_AMOUNT]`. A decimal comma is accepted.
    Amount {
        invalid: &'static str,
        too_large: &'static str,
    },
    /// Trimmed text with `min <= chars < max`.
    Text {
        min: usize,
        max: Option<usize>,
        too_short: &'static str,
        too_long: &'static str,
    },
    /// One of a fixed set of labels.
    OneOf { options: Vec<&'static str> },
    /// `YYYY-MM-DD`, not after the validation day, not before `min_year`.
    Date { min_year: i32, invalid: &'static str },
    Email { invalid: &'static str },
    /// Checkbox; absent or empty means `false`.
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: Rule,
    /// Message reported when the field is absent or blank. `None` lets the
    /// rule judge the empty value.
    pub required: Option<&'static str>,
}

impl FieldSpec {
    pub fn new(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            required: None,
        }
    }

    pub fn required(mut self, message: &'static str) -> Self {
        self.required = Some(message);
        self
    }
}

/// Typed value produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Amount(Decimal),
    Text(String),
    Date(NaiveDate),
    Flag(bool),
}

/// Ordered set of field specs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Validates `raw` against every field. `today` bounds date fields.
    pub fn validate(&self, raw: &RawForm, today: NaiveDate) -> Result<ValidatedForm, FieldErrors> {
        let mut values = BTreeMap::new();
        let mut errors = FieldErrors::default();

        for spec in &self.fields {
            let input = raw.get(spec.name).unwrap_or_default();
            if let Some(message) = spec.required {
                if input.trim().is_empty() {
                    errors.insert(spec.name, message);
                    continue;
                }
            }
            match apply_rule(&spec.rule, input, today) {
                Ok(value) => {
                    values.insert(spec.name, value);
                }
                Err(message) => errors.insert(spec.name, message),
            }
        }

        if errors.is_empty() {
            Ok(ValidatedForm { values })
        } else {
            Err(errors)
        }
    }
}

/// Output of a successful `Schema::validate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    values: BTreeMap<&'static str, FormValue>,
}

impl ValidatedForm {
    fn take(&self, name: &'static str) -> Result<&FormValue, FieldErrors> {
        self.values.get(name).ok_or_else(|| missing(name))
    }

    pub fn amount(&self, name: &'static str) -> Result<Decimal, FieldErrors> {
        match self.take(name)? {
            FormValue::Amount(value) => Ok(*value),
            _ => Err(missing(name)),
        }
    }

    pub fn text(&self, name: &'static str) -> Result<String, FieldErrors> {
        match self.take(name)? {
            FormValue::Text(value) => Ok(value.clone()),
            _ => Err(missing(name)),
        }
    }

    pub fn date(&self, name: &'static str) -> Result<NaiveDate, FieldErrors> {
        match self.take(name)? {
            FormValue::Date(value) => Ok(*value),
            _ => Err(missing(name)),
        }
    }

    pub fn flag(&self, name: &'static str) -> Result<bool, FieldErrors> {
        match self.take(name)? {
            FormValue::Flag(value) => Ok(*value),
            _ => Err(missing(name)),
        }
    }
}

fn missing(name: &'static str) -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.insert(name, "Valeur manquante.");
    errors
}

fn apply_rule(rule: &Rule, input: &str, today: NaiveDate) -> Result<FormValue, String> {
    match rule {
        Rule::Amount { invalid, too_large } => match parse_amount(input) {
            None => Err(invalid.to_string()),
            Some(amount) if amount > MAX_AMOUNT => Err(too_large.to_string()),
            Some(amount) => Ok(FormValue::Amount(amount)),
        },
        Rule::Text {
            min,
            max,
            too_short,
            too_long,
        } => {
            let text = input.trim();
            let length = text.chars().count();
            if length < *min {
                return Err(too_short.to_string());
            }
            if max.is_some_and(|max| length >= max) {
                return Err(too_long.to_string());
            }
            Ok(FormValue::Text(text.to_string()))
        }
        Rule::OneOf { options } => {
            let value = input.trim();
            if options.iter().any(|option| *option == value) {
                Ok(FormValue::Text(value.to_string()))
            } else {
                let expected =
                    serde_json::to_string(options).unwrap_or_else(|_| options.join(", "));
                Err(format!("Type invalide. Attendu {expected}, reçu \"{value}\""))
            }
        }
        Rule::Date { min_year, invalid } => {
            let date = NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
                .map_err(|_| invalid.to_string())?;
            if date > today || date.year() < *min_year {
                return Err(invalid.to_string());
            }
            Ok(FormValue::Date(date))
        }
        Rule::Email { invalid } => {
            let value = input.trim();
            if EMAIL_RE.is_match(value) {
                Ok(FormValue::Text(value.to_string()))
            } else {
                Err(invalid.to_string())
            }
        }
        Rule::Flag => parse_flag(input)
            .map(FormValue::Flag)
            .ok_or_else(|| "Valeur de case à cocher invalide.".to_string()),
    }
}

fn parse_amount(input: &str) -> Option<Decimal> {
    let normalized = input.trim().replace(',', ".");
    let amount = Decimal::from_str(&normalized).ok()?;
    (amount > Decimal::ZERO).then_some(amount)
}

fn parse_flag(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "off" | "0" | "no" | "non" => Some(false),
        "true" | "on" | "1" | "yes" | "oui" => Some(true),
        _ => None,
    }
}
