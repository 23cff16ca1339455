use super::support::*;
use rewind::JsonFileStorage;
use tempfile::TempDir;

#[tokio::test]
async fn json_ledger_persists_across_migrators() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("state").join("executed.json");
    let journal = Journal::default();

    let first = Migrator::new(tracked_set(&["A", "B", "C"], &journal), JsonFileStorage::new(&path));
    first.up(SelectionOptions::new().with_step(2)).await.expect("up two");
    assert!(path.exists());

    let second = Migrator::new(tracked_set(&["A", "B", "C"], &journal), JsonFileStorage::new(&path));
    assert_eq!(names(&second.executed().await.expect("executed")), vec!["A", "B"]);
    assert_eq!(names(&second.pending().await.expect("pending")), vec!["C"]);

    second.down(SelectionOptions::new()).await.expect("down");
    let records = second.storage().records().await.expect("records");
    let recorded: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(recorded, vec!["A"]);
}

#[tokio::test]
async fn json_ledger_rejects_corrupt_file() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("executed.json");
    std::fs::write(&path, "{not json").expect("write");

    let journal = Journal::default();
    let migrator = Migrator::new(tracked_set(&["A"], &journal), JsonFileStorage::new(&path));

    let err = migrator.up(SelectionOptions::new()).await.expect_err("corrupt ledger");
    assert!(matches!(err, MigrationError::StorageReadFailed(StorageError::Json(_))));
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn read_failure_surfaces_before_selection() {
    struct Unreachable;

    impl MigrationStorage for Unreachable {
        async fn log_migration(&self, _name: &str) -> Result<(), StorageError> {
            unreachable!("never written")
        }

        async fn unlog_migration(&self, _name: &str) -> Result<(), StorageError> {
            unreachable!("never written")
        }

        async fn executed(&self) -> Result<Vec<String>, StorageError> {
            Err(StorageError::other("connection refused"))
        }
    }

    let journal = Journal::default();
    let migrator = Migrator::new(tracked_set(&["A"], &journal), Unreachable);

    let err = migrator.down(SelectionOptions::new()).await.expect_err("read fails");
    assert!(matches!(err, MigrationError::StorageReadFailed(_)));
    assert!(err.to_string().contains("connection refused"));
}
