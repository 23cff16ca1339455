use super::support::*;

#[tokio::test]
async fn fails_fast_and_keeps_completed_steps() {
    let journal = Journal::default();
    let migrations = vec![
        tracked("A", &journal),
        failing("B", &journal),
        tracked("C", &journal),
    ];
    let migrator = Migrator::new(migrations, MemoryStorage::new());

    let err = migrator.up(SelectionOptions::new()).await.expect_err("B fails");

    match &err {
        MigrationError::ActionFailed { name, direction, completed, .. } => {
            assert_eq!(name, "B");
            assert_eq!(*direction, Direction::Up);
            assert_eq!(completed, &vec!["A".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.migration_name(), Some("B"));
    assert_eq!(journal.entries(), vec!["up:A", "up:B"]);
    assert_eq!(migrator.storage().snapshot(), vec!["A"]);
    assert_eq!(names(&migrator.pending().await.expect("pending")), vec!["B", "C"]);
}

#[tokio::test]
async fn duplicate_names_fail_before_touching_storage() {
    let journal = Journal::default();
    let storage = CountingStorage::default();
    let migrator = Migrator::new(tracked_set(&["A", "B", "A"], &journal), storage.clone());

    let err = migrator.up(SelectionOptions::new()).await.expect_err("duplicate A");
    assert!(matches!(err, MigrationError::DuplicateMigrationName { ref name } if name == "A"));

    let err = migrator.pending().await.expect_err("duplicate A");
    assert!(matches!(err, MigrationError::DuplicateMigrationName { .. }));

    assert_eq!(storage.calls(), 0);
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn missing_up_action_is_an_invalid_definition() {
    let migrator = Migrator::new(vec![Migration::named("A")], MemoryStorage::new());

    let err = migrator.migrations().await.expect_err("no up");
    assert!(matches!(err, MigrationError::InvalidMigrationDefinition { index: 0, .. }));
}

#[tokio::test]
async fn irreversible_migration_stops_down() {
    let journal = Journal::default();
    let migrations = vec![
        tracked("A", &journal),
        Migration::new("B", || async { Ok(()) }),
        tracked("C", &journal),
    ];
    let migrator = Migrator::new(migrations, MemoryStorage::with_executed(["A", "B", "C"]));

    let err = migrator
        .down(SelectionOptions::new().to_start())
        .await
        .expect_err("B has no down");

    match &err {
        MigrationError::MissingReverseAction { name, completed } => {
            assert_eq!(name, "B");
            assert_eq!(completed, &vec!["C".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(journal.entries(), vec!["down:C"]);
    assert_eq!(migrator.storage().snapshot(), vec!["A", "B"]);
}

#[tokio::test]
async fn storage_write_failure_is_reported_after_action_ran() {
    let journal = Journal::default();
    let migrator = Migrator::new(tracked_set(&["A", "B"], &journal), ReadOnlyStorage);

    let err = migrator.up(SelectionOptions::new()).await.expect_err("write fails");
    match &err {
        MigrationError::StorageWriteFailed { name, completed, .. } => {
            assert_eq!(name, "A");
            assert!(completed.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(journal.entries(), vec!["up:A"]);
}

#[tokio::test]
async fn listeners_observe_each_step_in_order() {
    let journal = Journal::default();
    let events: Arc<Mutex<Vec<String>>> = Arc::default();
    let mut migrator = Migrator::new(tracked_set(&["A", "B"], &journal), MemoryStorage::new());

    let sink = events.clone();
    migrator.on_any(move |event| {
        sink.lock().unwrap().push(format!("{}:{}", event.kind, event.name));
        Ok(())
    });

    migrator.up(SelectionOptions::new()).await.expect("up");
    migrator.down(SelectionOptions::new()).await.expect("down");

    assert_eq!(
        *events.lock().unwrap(),
        vec!["migrating:A", "migrated:A", "migrating:B", "migrated:B", "reverting:B", "reverted:B"]
    );
}

#[tokio::test]
async fn listener_error_aborts_the_step() {
    let journal = Journal::default();
    let mut migrator = Migrator::new(tracked_set(&["A", "B"], &journal), MemoryStorage::new());

    migrator.on(MigrationEventKind::Migrating, |event| {
        if event.name == "B" {
            return Err("B is frozen".into());
        }
        Ok(())
    });

    let err = migrator.up(SelectionOptions::new()).await.expect_err("listener vetoes B");
    match &err {
        MigrationError::ListenerFailed { name, event, completed, .. } => {
            assert_eq!(name, "B");
            assert_eq!(*event, MigrationEventKind::Migrating);
            assert_eq!(completed, &vec!["A".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(journal.entries(), vec!["up:A"]);
    assert_eq!(migrator.storage().snapshot(), vec!["A"]);
}

#[tokio::test]
async fn failing_migrated_listener_reports_the_recorded_step() {
    let journal = Journal::default();
    let mut migrator = Migrator::new(tracked_set(&["A", "B"], &journal), MemoryStorage::new());

    migrator.on(MigrationEventKind::Migrated, |event| {
        if event.name == "A" {
            return Err("notification failed".into());
        }
        Ok(())
    });

    let err = migrator.up(SelectionOptions::new()).await.expect_err("listener fails after A");
    match &err {
        MigrationError::ListenerFailed { name, event, completed, .. } => {
            assert_eq!(name, "A");
            assert_eq!(*event, MigrationEventKind::Migrated);
            assert_eq!(completed, &vec!["A".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(journal.entries(), vec!["up:A"]);
    assert_eq!(migrator.storage().snapshot(), vec!["A"]);
}

#[tokio::test]
async fn execute_runs_names_in_given_order() {
    let journal = Journal::default();
    let migrator = Migrator::new(tracked_set(&["A", "B", "C"], &journal), MemoryStorage::new());

    let ran = migrator.execute(["C", "A"], Direction::Up).await.expect("execute");
    assert_eq!(names(&ran), vec!["C", "A"]);
    assert_eq!(journal.entries(), vec!["up:C", "up:A"]);

    let err = migrator.execute(["Z"], Direction::Up).await.expect_err("Z is unknown");
    assert!(matches!(err, MigrationError::MigrationNotFound { .. }));
}

#[tokio::test]
async fn execute_never_reapplies_an_executed_migration() {
    let journal = Journal::default();
    let migrator = Migrator::new(tracked_set(&["A", "B"], &journal), MemoryStorage::new());
    migrator.up(["A"]).await.expect("up A");

    let ran = migrator.execute(["A", "B"], Direction::Up).await.expect("execute");
    assert_eq!(names(&ran), vec!["B"]);
    assert_eq!(journal.entries(), vec!["up:A", "up:B"]);

    let ran = migrator.execute(["A"], Direction::Up).await.expect("execute again");
    assert!(ran.is_empty());
    assert_eq!(journal.entries(), vec!["up:A", "up:B"]);
}

#[tokio::test]
async fn execute_down_skips_pending_migrations() {
    let journal = Journal::default();
    let migrator = Migrator::new(tracked_set(&["A", "B"], &journal), MemoryStorage::with_executed(["A"]));

    let ran = migrator.execute(["B", "A"], Direction::Down).await.expect("execute down");
    assert_eq!(names(&ran), vec!["A"]);
    assert_eq!(journal.entries(), vec!["down:A"]);
    assert!(migrator.storage().snapshot().is_empty());
}

#[tokio::test]
async fn unknown_executed_names_are_reported_not_fatal() {
    let journal = Journal::default();
    let storage = MemoryStorage::with_executed(["A", "legacy"]);
    let migrator = Migrator::new(tracked_set(&["A", "B"], &journal), storage);

    let reconciliation = migrator.reconcile().await.expect("reconcile");
    assert_eq!(reconciliation.unknown, vec!["legacy"]);
    assert_eq!(names(&reconciliation.executed), vec!["A"]);

    let ran = migrator.up(SelectionOptions::new()).await.expect("up");
    assert_eq!(names(&ran), vec!["B"]);
}

#[tokio::test]
async fn definitions_are_reread_on_every_call() {
    use rewind::FnSource;

    let journal = Journal::default();
    let count = Arc::new(AtomicUsize::new(1));
    let source_count = count.clone();
    let source_journal = journal.clone();
    let source = FnSource::new(move || {
        let n = source_count.load(Ordering::SeqCst);
        let journal = source_journal.clone();
        async move {
            let migrations: Vec<Migration> =
                (1..=n).map(|i| tracked(&format!("{i:03}"), &journal)).collect();
            Ok::<_, MigrationError>(migrations)
        }
    });
    let migrator = Migrator::new(source, MemoryStorage::new());

    assert_eq!(names(&migrator.up(SelectionOptions::new()).await.expect("up")), vec!["001"]);

    count.store(3, Ordering::SeqCst);
    assert_eq!(
        names(&migrator.pending().await.expect("pending")),
        vec!["002", "003"]
    );
}
