//! Expense record and VAT arithmetic.
//!
//! Amounts are entered tax-inclusive. When VAT applies, the tax-exclusive
//! part is `amount / 1.20` and the tax is the remainder.
//!
//! # Invariants
//! - `tax_exclusive_amount() + tax_amount() == amount` exactly.
//! - Amounts lie in `(0, MAX_AMOUNT]`, so totals over any realistic number
//!   of records stay far below `Decimal::MAX`.

use super::ModelValidationError;
use crate::remote::DocumentId;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::fmt::{Display, Formatter};

/// `1 + 20%`, the divisor turning a tax-inclusive amount into its base.
pub const TAX_DIVISOR: Decimal = Decimal::from_parts(120, 0, 0, false, 2);

/// Largest accepted amount, `10^15`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Fixed expense categories. Labels are the values stored in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseCategory {
    Alimentation,
    Gestion,
    Vehicule,
    Salaire,
}

impl ExpenseCategory {
    pub const ALL: [Self; 4] = [Self::Alimentation, Self::Gestion, Self::Vehicule, Self::Salaire];

    pub fn label(self) -> &'static str {
        match self {
            Self::Alimentation => "Alimentation",
            Self::Gestion => "Gestion",
            Self::Vehicule => "Véhicule",
            Self::Salaire => "Salaire",
        }
    }

    pub fn labels() -> [&'static str; 4] {
        Self::ALL.map(Self::label)
    }

    pub fn from_label(value: &str) -> Result<Self, ModelValidationError> {
        Self::ALL
            .into_iter()
            .find(|category| category.label() == value)
            .ok_or_else(|| ModelValidationError::UnknownCategory(value.to_string()))
    }
}

impl Display for ExpenseCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    pub id: DocumentId,
    /// Tax-inclusive amount.
    pub amount: Decimal,
    pub description: String,
    pub category: ExpenseCategory,
    pub tax_applicable: bool,
    /// Day the money was spent, chosen by the user.
    pub spent_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    /// Tax amount as stored with the document, rounded to cents.
    pub stored_tax: Decimal,
}

impl Expense {
    pub fn tax_exclusive_amount(&self) -> Decimal {
        tax_exclusive(self.amount, self.tax_applicable)
    }

    pub fn tax_amount(&self) -> Decimal {
        tax_of(self.amount, self.tax_applicable)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_amount(self.amount)
    }
}

/// Validated expense fields, used both to create and to edit an expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseInput {
    pub amount: Decimal,
    pub description: String,
    pub category: ExpenseCategory,
    pub spent_on: NaiveDate,
    pub tax_applicable: bool,
}

pub fn tax_exclusive(amount: Decimal, tax_applicable: bool) -> Decimal {
    if tax_applicable {
        amount / TAX_DIVISOR
    } else {
        amount
    }
}

pub fn tax_of(amount: Decimal, tax_applicable: bool) -> Decimal {
    if tax_applicable {
        amount - tax_exclusive(amount, true)
    } else {
        Decimal::ZERO
    }
}

/// Tax amount rounded to cents, the form persisted with each expense.
pub fn stored_tax_of(amount: Decimal, tax_applicable: bool) -> Decimal {
    tax_of(amount, tax_applicable).round_dp(2)
}

pub(crate) fn check_amount(amount: Decimal) -> Result<(), ModelValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ModelValidationError::NonPositiveAmount(amount.to_string()));
    }
    if amount > MAX_AMOUNT {
        return Err(ModelValidationError::AmountTooLarge(amount.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        check_amount, stored_tax_of, tax_exclusive, tax_of, ExpenseCategory, MAX_AMOUNT,
        TAX_DIVISOR,
    };
    use crate::model::ModelValidationError;
    use rust_decimal::Decimal;

    #[test]
    fn divisor_is_one_point_twenty() {
        assert_eq!(TAX_DIVISOR, Decimal::new(12, 1));
    }

    #[test]
    fn amount_ceiling_is_one_quadrillion() {
        assert_eq!(MAX_AMOUNT, Decimal::new(1_000_000_000_000_000, 0));
        assert_eq!(check_amount(MAX_AMOUNT), Ok(()));
        assert!(matches!(
            check_amount(MAX_AMOUNT + Decimal::new(1, 2)),
            Err(ModelValidationError::AmountTooLarge(_))
        ));
        assert!(matches!(
            check_amount(Decimal::ZERO),
            Err(ModelValidationError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn tax_split_for_applicable_amount() {
        let amount = Decimal::new(12000, 2);
        assert_eq!(tax_exclusive(amount, true), Decimal::new(100, 0));
        assert_eq!(tax_of(amount, true), Decimal::new(20, 0));
    }

    #[test]
    fn tax_split_for_exempt_amount() {
        let amount = Decimal::new(5000, 2);
        assert_eq!(tax_exclusive(amount, false), amount);
        assert_eq!(tax_of(amount, false), Decimal::ZERO);
    }

    #[test]
    fn stored_tax_rounds_to_cents() {
        assert_eq!(stored_tax_of(Decimal::new(50, 0), true), Decimal::new(833, 2));
    }

    #[test]
    fn category_labels_roundtrip() {
        for category in ExpenseCategory::ALL {
            assert_eq!(ExpenseCategory::from_label(category.label()), Ok(category));
        }
        assert!(ExpenseCategory::from_label("Loisirs").is_err());
    }
}
