mod common;

use carnet_core::remote::{CollectionStore, FieldValue, SqliteCollectionStore};
use carnet_core::TaskStore;
use common::{at, done_task_doc, fixed_now, id, task_doc, Call, ScriptedStore};

fn sqlite_tasks(remote: &SqliteCollectionStore) -> TaskStore<&SqliteCollectionStore> {
    let mut store = TaskStore::new(remote).with_clock(fixed_now);
    let _subscription = store.subscribe().unwrap();
    store.poll_snapshots();
    store
}

#[test]
fn added_task_appears_with_next_snapshot() {
    let remote = SqliteCollectionStore::open_in_memory().unwrap();
    let mut store = sqlite_tasks(&remote);
    assert!(store.is_empty());
    assert!(!store.is_loading());

    let task_id = store.add_task("Appeler le comptable").unwrap();
    assert!(store.is_empty());

    assert_eq!(store.poll_snapshots(), 1);
    let task = store.get(task_id).unwrap();
    assert_eq!(task.text, "Appeler le comptable");
    assert!(!task.done);
    assert_eq!(task.created_at, fixed_now());
    assert_eq!(task.completed_at, None);
}

#[test]
fn toggle_keeps_completion_stamp_in_step_with_flag() {
    let remote = SqliteCollectionStore::open_in_memory().unwrap();
    let mut store = sqlite_tasks(&remote);
    let task_id = store.add_task("Classer les factures").unwrap();
    store.poll_snapshots();

    assert!(store.toggle(task_id).unwrap());
    let task = store.get(task_id).unwrap();
    assert!(task.done);
    assert_eq!(task.completed_at, Some(fixed_now()));

    store.poll_snapshots();
    let task = store.get(task_id).unwrap();
    assert!(task.done);
    assert_eq!(task.completed_at, Some(fixed_now()));

    assert!(!store.toggle(task_id).unwrap());
    store.poll_snapshots();
    let task = store.get(task_id).unwrap();
    assert!(!task.done);
    assert_eq!(task.completed_at, None);
}

#[test]
fn progress_counts_completed_tasks() {
    let remote = ScriptedStore::new();
    let mut store = TaskStore::new(&remote);
    assert_eq!(store.progress_percent(), 0.0);

    let _subscription = store.subscribe().unwrap();
    remote.push(
        "todos",
        vec![
            task_doc(id(1), "Un", at(1, 8)),
            done_task_doc(id(2), "Deux", at(2, 8)),
            task_doc(id(3), "Trois", at(3, 8)),
            done_task_doc(id(4), "Quatre", at(4, 8)),
        ],
    );
    store.poll_snapshots();

    assert_eq!(store.completed_count(), 2);
    assert_eq!(store.progress_percent(), 50.0);
}

#[test]
fn empty_snapshot_after_insert_clears_cache() {
    let remote = ScriptedStore::new();
    let mut store = TaskStore::new(&remote);
    let _subscription = store.subscribe().unwrap();
    assert!(store.is_loading());

    remote.push("todos", vec![task_doc(id(1), "Un", at(1, 8))]);
    store.poll_snapshots();
    assert_eq!(store.len(), 1);

    remote.push("todos", Vec::new());
    store.poll_snapshots();
    assert!(store.is_empty());
    assert!(!store.is_loading());
}

#[test]
fn malformed_documents_are_skipped() {
    let remote = ScriptedStore::new();
    let mut store = TaskStore::new(&remote);
    let _subscription = store.subscribe().unwrap();

    let mut inconsistent = task_doc(id(2), "Fait sans date", at(2, 8));
    inconsistent
        .fields
        .insert("fait".to_string(), FieldValue::from(true));
    let mut untyped = task_doc(id(3), "Mauvais type", at(3, 8));
    untyped
        .fields
        .insert("date_ajout".to_string(), FieldValue::from("hier"));

    remote.push(
        "todos",
        vec![task_doc(id(1), "Valide", at(1, 8)), inconsistent, untyped],
    );
    store.poll_snapshots();

    assert_eq!(store.len(), 1);
    assert_eq!(store.items()[0].id, id(1));
}

#[test]
fn subscription_error_keeps_cache_and_sets_message() {
    let remote = ScriptedStore::new();
    let mut store = TaskStore::new(&remote);
    let _subscription = store.subscribe().unwrap();
    remote.push("todos", vec![task_doc(id(1), "Un", at(1, 8))]);
    store.poll_snapshots();

    remote.push_error("todos", "permission denied");
    store.poll_snapshots();

    assert_eq!(store.len(), 1);
    assert!(!store.is_loading());
    assert_eq!(store.error(), Some("Erreur lors du chargement des tâches"));

    store.clear_error();
    assert_eq!(store.error(), None);
}

#[test]
fn failed_subscribe_is_reported() {
    let remote = ScriptedStore::new();
    remote.fail_subscribe(true);
    let mut store = TaskStore::new(&remote);

    let err = store.subscribe().unwrap_err();
    assert_eq!(err.user_message(), "Erreur lors du chargement des tâches");
    assert!(!store.is_loading());
    assert_eq!(store.subscription_count(), 0);
}

#[test]
fn unsubscribe_stops_cache_updates() {
    let remote = ScriptedStore::new();
    let mut store = TaskStore::new(&remote);
    let handle = store.subscribe().unwrap();
    remote.push("todos", vec![task_doc(id(1), "Un", at(1, 8))]);
    store.poll_snapshots();

    assert!(store.unsubscribe(handle));
    assert!(!store.unsubscribe(handle));
    assert_eq!(remote.open_subscriptions("todos"), 0);

    remote.push("todos", Vec::new());
    assert_eq!(store.poll_snapshots(), 0);
    assert_eq!(store.len(), 1);
}

#[test]
fn subscriptions_are_independent() {
    let remote = ScriptedStore::new();
    let mut store = TaskStore::new(&remote);
    let first = store.subscribe().unwrap();
    let _second = store.subscribe().unwrap();
    assert_eq!(store.subscription_count(), 2);
    assert_eq!(remote.open_subscriptions("todos"), 2);

    assert!(store.unsubscribe(first));
    remote.push("todos", vec![task_doc(id(7), "Sept", at(7, 8))]);

    assert_eq!(store.poll_snapshots(), 1);
    assert_eq!(store.len(), 1);
}

#[test]
fn update_of_missing_task_rolls_back_and_sets_error() {
    let remote = SqliteCollectionStore::open_in_memory().unwrap();
    let mut store = sqlite_tasks(&remote);
    let task_id = store.add_task("Payer la TVA").unwrap();
    store.poll_snapshots();

    // Deleted behind the store's back; the cache still holds it.
    remote.delete("todos", task_id).unwrap();

    let err = store.set_task(task_id, "Payer la TVA en ligne", true).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(store.error(), Some("Erreur lors de la mise à jour de la tâche"));
    let task = store.get(task_id).unwrap();
    assert_eq!(task.text, "Payer la TVA");
    assert!(!task.done);
    assert_eq!(task.completed_at, None);
}

#[test]
fn toggle_of_uncached_task_is_not_found() {
    let remote = ScriptedStore::new();
    let mut store = TaskStore::new(&remote);

    let err = store.toggle(id(99)).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(remote.write_count(), 0);
}

#[test]
fn failed_remove_restores_task_position() {
    let remote = ScriptedStore::new();
    let mut store = TaskStore::new(&remote);
    let _subscription = store.subscribe().unwrap();
    remote.push(
        "todos",
        vec![
            task_doc(id(1), "Un", at(1, 8)),
            task_doc(id(2), "Deux", at(2, 8)),
            task_doc(id(3), "Trois", at(3, 8)),
        ],
    );
    store.poll_snapshots();

    remote.fail_writes(true);
    let err = store.remove(id(2)).unwrap_err();
    assert!(!err.is_not_found());
    assert_eq!(store.error(), Some("Erreur lors de la suppression de la tâche"));

    let order: Vec<_> = store.items().iter().map(|task| task.id).collect();
    assert_eq!(order, vec![id(3), id(2), id(1)]);
    assert_eq!(remote.calls().last(), Some(&Call::Delete("todos".to_string(), id(2))));
}

#[test]
fn failed_add_leaves_cache_untouched() {
    let remote = ScriptedStore::new();
    remote.fail_writes(true);
    let mut store = TaskStore::new(&remote);

    let err = store.add_task("Relancer le client").unwrap_err();
    assert_eq!(err.user_message(), "Erreur lors de l'ajout de la tâche");
    assert!(store.is_empty());
    assert!(!store.is_loading());
}

#[test]
fn poll_drains_subscriptions_in_the_order_they_were_opened() {
    let remote = ScriptedStore::new();
    let mut store = TaskStore::new(&remote);
    let _first = store.subscribe().unwrap();
    let _second = store.subscribe().unwrap();

    remote.push("todos", vec![task_doc(id(1), "Un", at(1, 8))]);
    remote.push(
        "todos",
        vec![
            task_doc(id(1), "Un", at(1, 8)),
            task_doc(id(2), "Deux", at(2, 8)),
        ],
    );

    assert_eq!(store.poll_snapshots(), 4);
    let order: Vec<_> = store.items().iter().map(|task| task.id).collect();
    assert_eq!(order, vec![id(2), id(1)]);
}
