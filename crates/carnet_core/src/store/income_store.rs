//! Income store over the `recettes` collection.

use super::entity::{Entity, StoreMessages};
use super::EntityStore;
use crate::model::income::{Income, IncomeInput};
use crate::remote::{
    fields, CollectionStore, Document, DocumentId, FieldValue, Fields, RemoteError, RemoteResult,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

const FIELD_AMOUNT: &str = "montant";
const FIELD_DESCRIPTION: &str = "description";
const FIELD_CATEGORY: &str = "categorie";
const FIELD_CREATED_AT: &str = "date_ajout";

pub type IncomeStore<S> = EntityStore<Income, S>;

impl Entity for Income {
    type Draft = IncomeInput;
    type Patch = IncomeInput;

    const COLLECTION: &'static str = "recettes";
    const MESSAGES: StoreMessages = StoreMessages {
        load: "Erreur lors du chargement des recettes",
        add: "Erreur lors de l'ajout de la recette",
        update: "Erreur lors de la mise à jour de la recette",
        remove: "Erreur lors de la suppression de la recette",
    };

    fn id(&self) -> DocumentId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn decode(document: &Document) -> RemoteResult<Self> {
        let reader = document.reader(Self::COLLECTION);
        let income = Income {
            id: document.id,
            amount: reader.decimal(FIELD_AMOUNT)?,
            description: reader.text(FIELD_DESCRIPTION)?,
            category: reader.text(FIELD_CATEGORY)?,
            created_at: reader.datetime(FIELD_CREATED_AT)?,
        };
        income
            .validate()
            .map_err(|err| RemoteError::InvalidData(format!("recettes/{}: {err}", document.id)))?;
        Ok(income)
    }

    fn draft_fields(draft: &IncomeInput, created_at: DateTime<Utc>) -> Fields {
        let mut document = Self::patch_fields(draft);
        document.insert(FIELD_CREATED_AT.to_string(), FieldValue::from(created_at));
        document
    }

    fn patch_fields(patch: &IncomeInput) -> Fields {
        fields([
            (FIELD_AMOUNT, FieldValue::from(patch.amount)),
            (FIELD_DESCRIPTION, FieldValue::from(patch.description.as_str())),
            (FIELD_CATEGORY, FieldValue::from(patch.category.as_str())),
        ])
    }

    fn apply_patch(&mut self, patch: &IncomeInput) {
        self.amount = patch.amount;
        self.description = patch.description.clone();
        self.category = patch.category.clone();
    }
}

impl<S: CollectionStore> EntityStore<Income, S> {
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|income| income.amount).sum()
    }
}
