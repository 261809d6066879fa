use filedrop::error::ServerError;
use filedrop::storage::{STAGING_PREFIX, Storage, StoredFile, format_file_size};

#[test]
fn test_format_file_size() {
    assert_eq!(format_file_size(0), "0 B");
    assert_eq!(format_file_size(1023), "1023 B");
    assert_eq!(format_file_size(1024), "1.0 KB");
    assert_eq!(format_file_size(1536), "1.5 KB");
    assert_eq!(format_file_size(1024 * 1024), "1.0 MB");
    assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5.0 GB");
    assert_eq!(format_file_size(u64::MAX), "16.0 EB");
}

#[test]
fn test_resolve_accepts_plain_names() {
    let storage = Storage::new("/srv/uploads", 10);

    let path = storage.resolve("report 2024.pdf").unwrap();
    assert_eq!(path, std::path::Path::new("/srv/uploads/report 2024.pdf"));
}

#[test]
fn test_resolve_rejects_traversal() {
    let storage = Storage::new("/srv/uploads", 10);

    for name in ["", ".", "..", "../etc/passwd", "a/b", "/etc/passwd", "..\\x", "nul\0byte"] {
        assert!(
            matches!(storage.resolve(name), Err(ServerError::InvalidFileName(_))),
            "{name:?} should be rejected"
        );
    }
}

#[tokio::test]
async fn test_list_only_counts_regular_files() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(dir.path(), 10);
    tokio::fs::write(dir.path().join("b.txt"), b"12345").await.unwrap();
    tokio::fs::write(dir.path().join("a.txt"), b"1").await.unwrap();
    tokio::fs::create_dir(dir.path().join("subdir")).await.unwrap();

    let files = storage.list().await.unwrap();

    assert_eq!(
        files,
        vec![
            StoredFile { name: "a.txt".into(), size: 1 },
            StoredFile { name: "b.txt".into(), size: 5 },
        ]
    );
    assert_eq!(storage.count_files().await.unwrap(), 2);
}

#[tokio::test]
async fn test_staging_files_are_hidden_and_unnamable() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(dir.path(), 10);
    let first = storage.staging_path();
    let second = storage.staging_path();
    assert_ne!(first, second);
    assert_eq!(first.parent(), Some(dir.path()));

    tokio::fs::write(&first, b"half").await.unwrap();
    tokio::fs::write(dir.path().join("done.txt"), b"1").await.unwrap();

    let names: Vec<String> = storage
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["done.txt"]);

    let staged_name = first.file_name().unwrap().to_str().unwrap();
    assert!(staged_name.starts_with(STAGING_PREFIX));
    assert!(matches!(
        storage.resolve(staged_name),
        Err(ServerError::InvalidFileName(_))
    ));
}

#[tokio::test]
async fn test_list_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let uploads = dir.path().join("files");
    let storage = Storage::new(&uploads, 10);

    assert!(storage.list().await.unwrap().is_empty());
    assert!(uploads.is_dir());
}

#[tokio::test]
async fn test_reserve_slot_enforces_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(dir.path(), 2);
    tokio::fs::write(dir.path().join("one"), b"1").await.unwrap();

    let slot = storage.reserve_slot().await.unwrap();

    // The held slot counts against the ceiling.
    let second = storage.reserve_slot().await;
    assert!(matches!(
        second,
        Err(ServerError::QuotaExceeded { current: 2, max: 2 })
    ));

    drop(slot);
    assert!(storage.reserve_slot().await.is_ok());
}

#[tokio::test]
async fn test_delete_existing_and_missing() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(dir.path(), 10);
    tokio::fs::write(dir.path().join("gone.txt"), b"x").await.unwrap();

    storage.delete("gone.txt").await.unwrap();
    assert!(!dir.path().join("gone.txt").exists());

    let again = storage.delete("gone.txt").await;
    assert!(matches!(again, Err(ServerError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_refuses_directories() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(dir.path(), 10);
    tokio::fs::create_dir(dir.path().join("keep")).await.unwrap();

    assert!(matches!(
        storage.delete("keep").await,
        Err(ServerError::NotFound(_))
    ));
    assert!(dir.path().join("keep").is_dir());
}
