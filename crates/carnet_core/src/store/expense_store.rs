//! Expense store over the `depenses` collection, with VAT totals.
//!
//! Totals are recomputed from the cache on every call.

use super::entity::{Entity, StoreMessages};
use super::EntityStore;
use crate::model::expense::{stored_tax_of, Expense, ExpenseCategory, ExpenseInput};
use crate::model::ModelValidationError;
use crate::remote::{
    fields, CollectionStore, Document, DocumentId, FieldValue, Fields, RemoteError, RemoteResult,
    StoreTimestamp,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

const FIELD_AMOUNT: &str = "montant";
const FIELD_DESCRIPTION: &str = "description";
const FIELD_CATEGORY: &str = "categorie";
const FIELD_SPENT_ON: &str = "date";
const FIELD_CREATED_AT: &str = "date_ajout";
const FIELD_TAX_APPLICABLE: &str = "isTVAApplicable";
const FIELD_TAX: &str = "tva";

pub type ExpenseStore<S> = EntityStore<Expense, S>;

fn input_fields(input: &ExpenseInput) -> Fields {
    fields([
        (FIELD_AMOUNT, FieldValue::from(input.amount)),
        (FIELD_DESCRIPTION, FieldValue::from(input.description.as_str())),
        (FIELD_CATEGORY, FieldValue::from(input.category.label())),
        (
            FIELD_SPENT_ON,
            FieldValue::Timestamp(StoreTimestamp::from_date(input.spent_on)),
        ),
        (FIELD_TAX_APPLICABLE, FieldValue::from(input.tax_applicable)),
        (
            FIELD_TAX,
            FieldValue::from(stored_tax_of(input.amount, input.tax_applicable)),
        ),
    ])
}

impl Entity for Expense {
    type Draft = ExpenseInput;
    type Patch = ExpenseInput;

    const COLLECTION: &'static str = "depenses";
    const MESSAGES: StoreMessages = StoreMessages {
        load: "Erreur lors du chargement des dépenses",
        add: "Erreur lors de l'ajout de la dépense",
        update: "Erreur lors de la mise à jour de la dépense",
        remove: "Erreur lors de la suppression de la dépense",
    };

    fn id(&self) -> DocumentId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn decode(document: &Document) -> RemoteResult<Self> {
        let reader = document.reader(Self::COLLECTION);
        let invalid = |err: ModelValidationError| {
            RemoteError::InvalidData(format!("depenses/{}: {err}", document.id))
        };

        let expense = Expense {
            id: document.id,
            amount: reader.decimal(FIELD_AMOUNT)?,
            description: reader.text(FIELD_DESCRIPTION)?,
            category: ExpenseCategory::from_label(&reader.text(FIELD_CATEGORY)?).map_err(invalid)?,
            tax_applicable: reader.flag_or(FIELD_TAX_APPLICABLE, false)?,
            spent_on: reader.date(FIELD_SPENT_ON)?,
            created_at: reader.datetime(FIELD_CREATED_AT)?,
            stored_tax: reader.decimal_or(FIELD_TAX, Decimal::ZERO)?,
        };
        expense.validate().map_err(invalid)?;
        Ok(expense)
    }

    fn draft_fields(draft: &ExpenseInput, created_at: DateTime<Utc>) -> Fields {
        let mut document = input_fields(draft);
        document.insert(FIELD_CREATED_AT.to_string(), FieldValue::from(created_at));
        document
    }

    fn patch_fields(patch: &ExpenseInput) -> Fields {
        input_fields(patch)
    }

    fn apply_patch(&mut self, patch: &ExpenseInput) {
        self.amount = patch.amount;
        self.description = patch.description.clone();
        self.category = patch.category;
        self.spent_on = patch.spent_on;
        self.tax_applicable = patch.tax_applicable;
        self.stored_tax = stored_tax_of(patch.amount, patch.tax_applicable);
    }
}

impl<S: CollectionStore> EntityStore<Expense, S> {
    /// Sum of amounts before tax ("HT").
    pub fn total_tax_exclusive(&self) -> Decimal {
        self.items.iter().map(Expense::tax_exclusive_amount).sum()
    }

    /// Sum of VAT ("TVA").
    pub fn total_tax(&self) -> Decimal {
        self.items.iter().map(Expense::tax_amount).sum()
    }

    /// Sum of tax-inclusive amounts ("TTC").
    pub fn total_tax_inclusive(&self) -> Decimal {
        self.items.iter().map(|expense| expense.amount).sum()
    }
}
