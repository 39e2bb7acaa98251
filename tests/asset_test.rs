use std::io::{Cursor, Seek, SeekFrom};
use std::sync::Arc;

use barn::db;
use barn::domain::{AssetUpdate, AssetUpload, BookInput, DomainError};
use barn::storage::{BlobStore, FilesystemBlobStore};
use barn::AppState;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

// Helper to create a catalog over an in-memory database
async fn setup_state() -> (AppState, Arc<FilesystemBlobStore>, TempDir) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let media = tempfile::tempdir().expect("Failed to create media dir");
    let store = Arc::new(
        FilesystemBlobStore::new(media.path().to_path_buf())
            .await
            .expect("Failed to open blob store"),
    );
    (AppState::new(db, store.clone()), store, media)
}

// Helper to create a test book
async fn create_test_book(state: &AppState, title: &str) -> i32 {
    state
        .book_repo
        .create(BookInput {
            edition: "1st".to_string(),
            ..BookInput::titled(title)
        })
        .await
        .expect("Failed to create book")
        .id
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[tokio::test]
async fn test_asset_fingerprint_on_create() {
    let (state, store, _media) = setup_state().await;
    let book_id = create_test_book(&state, "Neuromancer").await;

    let content = b"%PDF-1.4 not really a pdf".to_vec();
    let asset = state
        .asset_repo
        .create(book_id, AssetUpload::from_bytes("scan.PDF", content.clone()))
        .await
        .unwrap();

    assert_eq!(asset.book_id, book_id);
    assert_eq!(asset.file_extension, "pdf");
    assert_eq!(asset.file_name, "Neuromancer (1st ed).pdf");
    assert_eq!(asset.file_size, content.len() as i64);
    assert_eq!(asset.file_hash, sha256_hex(&content));
    assert!(store.exists(&asset.file).await.unwrap());

    let stored = state.asset_repo.read(asset.id).await.unwrap();
    assert_eq!(stored, content);
}

#[tokio::test]
async fn test_partly_read_upload_is_stored_whole() {
    let (state, _store, _media) = setup_state().await;
    let book_id = create_test_book(&state, "Snow Crash").await;

    // A caller that already consumed part of the stream
    let mut cursor = Cursor::new(b"HEADERbody".to_vec());
    cursor.seek(SeekFrom::Start(6)).unwrap();

    let asset = state
        .asset_repo
        .create(book_id, AssetUpload::new("chapter.txt", cursor))
        .await
        .unwrap();

    assert_eq!(asset.file_size, 10);
    assert_eq!(asset.file_hash, sha256_hex(b"HEADERbody"));
    assert_eq!(state.asset_repo.read(asset.id).await.unwrap(), b"HEADERbody");
}

#[tokio::test]
async fn test_duplicate_content_is_rejected() {
    let (state, _store, _media) = setup_state().await;
    let first = create_test_book(&state, "First").await;
    let second = create_test_book(&state, "Second").await;

    state
        .asset_repo
        .create(first, AssetUpload::from_bytes("a.epub", b"same bytes".to_vec()))
        .await
        .unwrap();

    let duplicate = state
        .asset_repo
        .create(second, AssetUpload::from_bytes("b.epub", b"same bytes".to_vec()))
        .await;
    assert!(matches!(duplicate, Err(DomainError::Conflict(_))));
    assert!(state.asset_repo.find_by_book(second).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_to_duplicate_content_is_rejected() {
    let (state, store, _media) = setup_state().await;
    let book_id = create_test_book(&state, "Diaspora").await;

    let first = state
        .asset_repo
        .create(book_id, AssetUpload::from_bytes("a.txt", b"shared".to_vec()))
        .await
        .unwrap();
    let second = state
        .asset_repo
        .create(book_id, AssetUpload::from_bytes("b.md", b"distinct".to_vec()))
        .await
        .unwrap();

    // Same bytes as the first asset, stored under a different extension key
    let duplicate_key = format!("assets/{}.md", first.file_hash);
    let result = state
        .asset_repo
        .update(
            second.id,
            AssetUpdate {
                upload: Some(AssetUpload::from_bytes("c.md", b"shared".to_vec())),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(DomainError::Conflict(_))));

    let unchanged = state
        .asset_repo
        .find_by_id(second.id)
        .await
        .unwrap()
        .expect("asset survives a failed update");
    assert_eq!(unchanged, second);
    assert_eq!(state.asset_repo.read(second.id).await.unwrap(), b"distinct");
    assert!(!store.exists(&duplicate_key).await.unwrap());
    assert_eq!(state.asset_repo.read(first.id).await.unwrap(), b"shared");
}

#[tokio::test]
async fn test_asset_requires_extension_and_book() {
    let (state, _store, _media) = setup_state().await;
    let book_id = create_test_book(&state, "Extensionless").await;

    let no_ext = state
        .asset_repo
        .create(book_id, AssetUpload::from_bytes("README", b"x".to_vec()))
        .await;
    assert!(matches!(no_ext, Err(DomainError::Validation(_))));

    let no_book = state
        .asset_repo
        .create(404, AssetUpload::from_bytes("a.txt", b"x".to_vec()))
        .await;
    assert!(matches!(no_book, Err(DomainError::NotFound)));
}

#[tokio::test]
async fn test_asset_resave_recomputes_fingerprint() {
    let (state, store, _media) = setup_state().await;
    let book_id = create_test_book(&state, "Accelerando").await;
    let other_book = create_test_book(&state, "Glasshouse").await;

    let original = state
        .asset_repo
        .create(book_id, AssetUpload::from_bytes("book.txt", b"draft".to_vec()))
        .await
        .unwrap();

    let replaced = state
        .asset_repo
        .update(
            original.id,
            AssetUpdate {
                upload: Some(AssetUpload::from_bytes("book.md", b"final text".to_vec())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(replaced.id, original.id);
    assert_eq!(replaced.file_extension, "md");
    assert_eq!(replaced.file_size, 10);
    assert_eq!(replaced.file_hash, sha256_hex(b"final text"));
    assert!(!store.exists(&original.file).await.unwrap());

    // Moving to another book renames the file without new content
    let moved = state
        .asset_repo
        .update(
            original.id,
            AssetUpdate {
                book_id: Some(other_book),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(moved.book_id, other_book);
    assert_eq!(moved.file_name, "Glasshouse (1st ed).md");
    assert_eq!(moved.file_hash, replaced.file_hash);
    assert_eq!(
        state.asset_repo.read(moved.id).await.unwrap(),
        b"final text"
    );
}

#[tokio::test]
async fn test_assets_cascade_with_book() {
    let (state, store, _media) = setup_state().await;
    let book_id = create_test_book(&state, "Ephemeral").await;

    let pdf = state
        .asset_repo
        .create(book_id, AssetUpload::from_bytes("e.pdf", b"pdf".to_vec()))
        .await
        .unwrap();
    let epub = state
        .asset_repo
        .create(book_id, AssetUpload::from_bytes("e.epub", b"epub".to_vec()))
        .await
        .unwrap();

    let listed = state.asset_repo.find_by_book(book_id).await.unwrap();
    let extensions: Vec<&str> = listed.iter().map(|a| a.file_extension.as_str()).collect();
    assert_eq!(extensions, vec!["epub", "pdf"]);

    state.book_repo.delete(book_id).await.unwrap();

    assert!(state.asset_repo.find_by_id(pdf.id).await.unwrap().is_none());
    assert!(state.asset_repo.find_by_id(epub.id).await.unwrap().is_none());
    assert!(!store.exists(&pdf.file).await.unwrap());
    assert!(!store.exists(&epub.file).await.unwrap());
}

#[tokio::test]
async fn test_asset_delete() {
    let (state, store, _media) = setup_state().await;
    let book_id = create_test_book(&state, "Short-lived").await;

    let asset = state
        .asset_repo
        .create(book_id, AssetUpload::from_bytes("s.txt", b"bye".to_vec()))
        .await
        .unwrap();

    state.asset_repo.delete(asset.id).await.unwrap();
    assert!(!store.exists(&asset.file).await.unwrap());
    assert!(matches!(
        state.asset_repo.delete(asset.id).await,
        Err(DomainError::NotFound)
    ));
}
