use std::io::Cursor;
use std::sync::Arc;

use barn::db;
use barn::domain::{BookInput, DomainError};
use barn::services::cover_service;
use async_trait::async_trait;
use barn::storage::{BlobStore, FilesystemBlobStore, StorageError};
use barn::AppState;
use image::{GenericImageView, ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

// Helper to create a catalog over an in-memory database
async fn setup_state() -> (AppState, TempDir) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let media = tempfile::tempdir().expect("Failed to create media dir");
    let store = FilesystemBlobStore::new(media.path().to_path_buf())
        .await
        .expect("Failed to open blob store");
    (AppState::new(db, Arc::new(store)), media)
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([20, 90, 160]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[tokio::test]
async fn test_cover_and_thumbnail() {
    let (state, _media) = setup_state().await;
    let book = state
        .book_repo
        .create(BookInput::titled("Ubik"))
        .await
        .unwrap();

    let none = cover_service::cover_thumbnail(state.db(), state.store(), book.id)
        .await
        .unwrap();
    assert!(none.is_none());

    let key = cover_service::set_cover_image(
        state.db(),
        state.store(),
        book.id,
        "front.PNG",
        &png(600, 900),
    )
    .await
    .unwrap();
    assert_eq!(key, "cover_images/ubik.png");

    let reloaded = state.book_repo.find_by_id(book.id).await.unwrap().unwrap();
    assert_eq!(reloaded.cover_image.as_deref(), Some("cover_images/ubik.png"));

    let thumb = cover_service::cover_thumbnail(state.db(), state.store(), book.id)
        .await
        .unwrap()
        .expect("thumbnail for covered book");
    let decoded = image::load_from_memory_with_format(&thumb, ImageFormat::WebP).unwrap();
    assert!(decoded.width() <= 180 && decoded.height() <= 292);
    assert_eq!(decoded.height(), 270);

    let thumb_key = cover_service::thumbnail_key(&book.slug);
    assert!(state.store().exists(&thumb_key).await.unwrap());

    // A new cover invalidates the cached thumbnail
    cover_service::set_cover_image(state.db(), state.store(), book.id, "small.png", &png(90, 120))
        .await
        .unwrap();
    assert!(!state.store().exists(&thumb_key).await.unwrap());

    let small = cover_service::cover_thumbnail(state.db(), state.store(), book.id)
        .await
        .unwrap()
        .unwrap();
    let decoded = image::load_from_memory(&small).unwrap();
    assert_eq!(decoded.dimensions(), (90, 120));
}

#[tokio::test]
async fn test_cover_rejects_non_images() {
    let (state, _media) = setup_state().await;
    let book = state
        .book_repo
        .create(BookInput::titled("Valis"))
        .await
        .unwrap();

    let result = cover_service::set_cover_image(
        state.db(),
        state.store(),
        book.id,
        "cover.jpg",
        b"definitely not a jpeg",
    )
    .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_book_delete_removes_cover() {
    let (state, _media) = setup_state().await;
    let book = state
        .book_repo
        .create(BookInput::titled("Martian Time-Slip"))
        .await
        .unwrap();

    let key = cover_service::set_cover_image(state.db(), state.store(), book.id, "c.png", &png(10, 10))
        .await
        .unwrap();
    cover_service::cover_thumbnail(state.db(), state.store(), book.id)
        .await
        .unwrap();

    state.book_repo.delete(book.id).await.unwrap();
    assert!(!state.store().exists(&key).await.unwrap());
    assert!(
        !state
            .store()
            .exists(&cover_service::thumbnail_key(&book.slug))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_clear_cover() {
    let (state, _media) = setup_state().await;
    let book = state
        .book_repo
        .create(BookInput::titled("Galápagos"))
        .await
        .unwrap();
    assert_eq!(book.slug, "galapagos");

    let key = cover_service::set_cover_image(state.db(), state.store(), book.id, "g.png", &png(4, 4))
        .await
        .unwrap();
    cover_service::clear_cover_image(state.db(), state.store(), book.id)
        .await
        .unwrap();

    assert!(!state.store().exists(&key).await.unwrap());
    let reloaded = state.book_repo.find_by_id(book.id).await.unwrap().unwrap();
    assert!(reloaded.cover_image.is_none());
}

// Blob store whose writes always fail
struct ReadOnlyStore;

#[async_trait]
impl BlobStore for ReadOnlyStore {
    async fn put(&self, key: &str, _data: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::Backend(format!("read-only store refused {}", key)))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        Err(StorageError::NotFound(key.to_string()))
    }

    async fn exists(&self, _key: &str) -> Result<bool, StorageError> {
        Ok(false)
    }

    async fn delete(&self, _key: &str) -> Result<bool, StorageError> {
        Ok(false)
    }
}

#[tokio::test]
async fn test_failed_cover_upload_leaves_book_untouched() {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let state = AppState::new(db, Arc::new(ReadOnlyStore));
    let book = state
        .book_repo
        .create(BookInput::titled("Blindsight"))
        .await
        .unwrap();

    let result =
        cover_service::set_cover_image(state.db(), state.store(), book.id, "b.png", &png(8, 8))
            .await;
    assert!(matches!(result, Err(DomainError::Storage(_))));

    let reloaded = state.book_repo.find_by_id(book.id).await.unwrap().unwrap();
    assert!(reloaded.cover_image.is_none());
    assert_eq!(reloaded.updated_at, book.updated_at);
}
