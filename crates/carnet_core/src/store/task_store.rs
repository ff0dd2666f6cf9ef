//! Todo list store over the `todos` collection.
//!
//! # Invariants
//! - A task is written with `done = false` and no completion stamp.
//! - Every write of `done` also writes the matching completion stamp.

use super::entity::{Entity, StoreMessages};
use super::{EntityStore, StoreResult};
use crate::model::task::{NewTask, Task, TaskPatch};
use crate::remote::{
    fields, CollectionStore, Document, DocumentId, FieldValue, Fields, RemoteError, RemoteResult,
};
use chrono::{DateTime, Utc};

const FIELD_TEXT: &str = "tache";
const FIELD_DONE: &str = "fait";
const FIELD_CREATED_AT: &str = "date_ajout";
const FIELD_COMPLETED_AT: &str = "date_finit";

pub type TaskStore<S> = EntityStore<Task, S>;

impl Entity for Task {
    type Draft = NewTask;
    type Patch = TaskPatch;

    const COLLECTION: &'static str = "todos";
    const MESSAGES: StoreMessages = StoreMessages {
        load: "Erreur lors du chargement des tâches",
        add: "Erreur lors de l'ajout de la tâche",
        update: "Erreur lors de la mise à jour de la tâche",
        remove: "Erreur lors de la suppression de la tâche",
    };

    fn id(&self) -> DocumentId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn decode(document: &Document) -> RemoteResult<Self> {
        let reader = document.reader(Self::COLLECTION);
        let task = Task {
            id: document.id,
            text: reader.text(FIELD_TEXT)?,
            done: reader.flag_or(FIELD_DONE, false)?,
            created_at: reader.datetime(FIELD_CREATED_AT)?,
            completed_at: reader.optional_datetime(FIELD_COMPLETED_AT)?,
        };
        task.validate()
            .map_err(|err| RemoteError::InvalidData(format!("todos/{}: {err}", document.id)))?;
        Ok(task)
    }

    fn draft_fields(draft: &NewTask, created_at: DateTime<Utc>) -> Fields {
        fields([
            (FIELD_TEXT, FieldValue::from(draft.text.as_str())),
            (FIELD_DONE, FieldValue::from(false)),
            (FIELD_CREATED_AT, FieldValue::from(created_at)),
            (FIELD_COMPLETED_AT, FieldValue::Null),
        ])
    }

    fn patch_fields(patch: &TaskPatch) -> Fields {
        fields([
            (FIELD_TEXT, FieldValue::from(patch.text.as_str())),
            (FIELD_DONE, FieldValue::from(patch.done)),
            (FIELD_COMPLETED_AT, FieldValue::from(patch.completed_at)),
        ])
    }

    fn apply_patch(&mut self, patch: &TaskPatch) {
        self.text = patch.text.clone();
        self.done = patch.done;
        self.completed_at = patch.completed_at;
    }
}

impl<S: CollectionStore> EntityStore<Task, S> {
    pub fn add_task(&mut self, text: impl Into<String>) -> StoreResult<DocumentId> {
        self.add(&NewTask { text: text.into() })
    }

    /// Rewrites text and completion of a task, stamping completion now
    /// when `done` and clearing it otherwise.
    pub fn set_task(&mut self, id: DocumentId, text: impl Into<String>, done: bool) -> StoreResult<()> {
        let patch = TaskPatch::new(text, done, self.now());
        self.update(id, &patch)
    }

    /// Flips completion of a cached task. Returns the new `done` flag.
    pub fn toggle(&mut self, id: DocumentId) -> StoreResult<bool> {
        let Some(task) = self.get(id) else {
            let err = RemoteError::NotFound {
                collection: Task::COLLECTION.to_string(),
                id,
            };
            return Err(self.fail(Task::MESSAGES.update, "toggle", err));
        };

        let done = !task.done;
        let text = task.text.clone();
        self.set_task(id, text, done)?;
        Ok(done)
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|task| task.done).count()
    }

    /// Share of completed tasks in percent, `0.0` for an empty list.
    pub fn progress_percent(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 * 100.0 / self.items.len() as f64
    }
}
