use super::support::*;

fn migrator(journal: &Journal) -> Migrator<Vec<Migration>, MemoryStorage> {
    Migrator::new(tracked_set(&["A", "B", "C", "D"], journal), MemoryStorage::new())
}

#[tokio::test]
async fn queries_are_idempotent_and_partition_resolved_set() {
    let journal = Journal::default();
    let migrator = migrator(&journal);
    migrator.up(SelectionOptions::new().with_to("B")).await.expect("up to B");

    let first = migrator.reconcile().await.expect("first reconcile");
    let second = migrator.reconcile().await.expect("second reconcile");

    assert_eq!(names(&first.executed), vec!["A", "B"]);
    assert_eq!(names(&first.pending), vec!["C", "D"]);
    assert_eq!(names(&first.executed), names(&second.executed));
    assert_eq!(names(&first.pending), names(&second.pending));

    let mut combined = names(&first.executed);
    combined.extend(names(&first.pending));
    combined.sort();
    assert_eq!(combined, names(&first.resolved));
}

#[tokio::test]
async fn ranges_are_exact() {
    let journal = Journal::default();
    let migrator = migrator(&journal);

    let ran = migrator.up(SelectionOptions::new().with_to("B")).await.expect("up to B");
    assert_eq!(names(&ran), vec!["A", "B"]);

    let ran = migrator.up(SelectionOptions::new().with_from("B")).await.expect("up from B");
    assert_eq!(names(&ran), vec!["C", "D"]);

    assert_eq!(journal.entries(), vec!["up:A", "up:B", "up:C", "up:D"]);
}

#[tokio::test]
async fn up_then_down_to_start_round_trips() {
    let journal = Journal::default();
    let migrator = migrator(&journal);

    migrator.up(SelectionOptions::new()).await.expect("up");
    let reverted = migrator.down(SelectionOptions::new().to_start()).await.expect("down to start");

    assert_eq!(names(&reverted), vec!["D", "C", "B", "A"]);
    assert!(migrator.executed().await.expect("executed").is_empty());
    assert_eq!(migrator.pending().await.expect("pending").len(), 4);
    assert!(migrator.storage().snapshot().is_empty());
}

#[tokio::test]
async fn down_defaults_to_most_recent() {
    let journal = Journal::default();
    let migrator = migrator(&journal);
    migrator.up(SelectionOptions::new()).await.expect("up");

    let reverted = migrator.down(SelectionOptions::new()).await.expect("down");
    assert_eq!(names(&reverted), vec!["D"]);

    let reverted = migrator.down(SelectionOptions::new().with_step(2)).await.expect("down two");
    assert_eq!(names(&reverted), vec!["C", "B"]);
    assert_eq!(names(&migrator.executed().await.expect("executed")), vec!["A"]);
}

#[tokio::test]
async fn down_with_pending_name_is_not_found() {
    let journal = Journal::default();
    let migrator = migrator(&journal);

    let err = migrator.down(["A"]).await.expect_err("A is pending");
    assert!(matches!(err, MigrationError::MigrationNotFound { ref name, .. } if name == "A"));
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn unknown_name_is_not_found_even_when_allowed() {
    let journal = Journal::default();
    let migrator = migrator(&journal);

    let options = SelectionOptions::names(["X"]).with_rerun(Rerun::Allow);
    let err = migrator.up(options).await.expect_err("X is not defined");
    assert!(matches!(err, MigrationError::MigrationNotFound { ref name, .. } if name == "X"));
}

#[tokio::test]
async fn named_migrations_run_in_canonical_order() {
    let journal = Journal::default();
    let migrator = migrator(&journal);

    let ran = migrator.up(["C", "A"]).await.expect("up named");
    assert_eq!(names(&ran), vec!["A", "C"]);
    assert_eq!(names(&migrator.pending().await.expect("pending")), vec!["B", "D"]);
}

#[tokio::test]
async fn rerun_policy_controls_already_executed_names() {
    let journal = Journal::default();
    let migrator = migrator(&journal);
    migrator.up(["A"]).await.expect("up A");

    let err = migrator.up(["A", "B"]).await.expect_err("A already executed");
    assert!(matches!(err, MigrationError::MigrationNotFound { ref name, .. } if name == "A"));

    let ran = migrator
        .up(SelectionOptions::names(["A", "B"]).with_rerun(Rerun::Skip))
        .await
        .expect("skip A");
    assert_eq!(names(&ran), vec!["B"]);

    let ran = migrator
        .up(SelectionOptions::names(["A"]).with_rerun(Rerun::Allow))
        .await
        .expect("rerun A");
    assert_eq!(names(&ran), vec!["A"]);
    assert_eq!(journal.entries(), vec!["up:A", "up:B", "up:A"]);
}

#[tokio::test]
async fn invalid_combinations_are_rejected_before_running() {
    let journal = Journal::default();
    let migrator = migrator(&journal);

    let err = migrator
        .up(SelectionOptions::names(["A"]).with_to("B"))
        .await
        .expect_err("names with to");
    assert!(matches!(err, MigrationError::InvalidSelectionOptions { .. }));

    let err = migrator
        .up(SelectionOptions::new().with_step(1).with_to("B"))
        .await
        .expect_err("step with to");
    assert!(matches!(err, MigrationError::InvalidSelectionOptions { .. }));

    let err = migrator
        .up(SelectionOptions::new().with_from("C").with_to("A"))
        .await
        .expect_err("to before from");
    assert!(matches!(err, MigrationError::InvalidSelectionOptions { .. }));

    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn nothing_pending_is_not_an_error() {
    let journal = Journal::default();
    let migrator = migrator(&journal);
    migrator.up(SelectionOptions::new()).await.expect("up");

    let ran = migrator.up(SelectionOptions::new()).await.expect("second up");
    assert!(ran.is_empty());
    assert_eq!(journal.entries().len(), 4);
}
