use std::sync::Arc;

use barn::db;
use barn::domain::{BookInput, DomainError, TermInput};
use barn::storage::FilesystemBlobStore;
use barn::AppState;
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

#[tokio::test]
async fn test_reading_list_membership() {
    let (state, _media) = setup_state().await;

    let list = state
        .reading_list_repo
        .create(TermInput::named("Winter Reads"))
        .await
        .unwrap();
    assert_eq!(list.slug, "winter-reads");
    assert_eq!(list.total_books, 0);

    let first = state
        .book_repo
        .create(BookInput::titled("The Left Hand of Darkness"))
        .await
        .unwrap();
    let second = state
        .book_repo
        .create(BookInput::titled("The Dispossessed"))
        .await
        .unwrap();

    state.reading_list_repo.add_book(list.id, second.id).await.unwrap();
    state.reading_list_repo.add_book(list.id, first.id).await.unwrap();
    // Adding twice keeps a single membership
    state.reading_list_repo.add_book(list.id, first.id).await.unwrap();

    let entries = state.reading_list_repo.books(list.id).await.unwrap();
    let titles: Vec<&str> = entries.iter().map(|e| e.display_name.as_str()).collect();
    assert_eq!(titles, vec!["The Dispossessed", "The Left Hand of Darkness"]);

    state
        .reading_list_repo
        .remove_book(list.id, second.id)
        .await
        .unwrap();
    assert!(matches!(
        state.reading_list_repo.remove_book(list.id, second.id).await,
        Err(DomainError::NotFound)
    ));

    let reloaded = state
        .reading_list_repo
        .find_by_slug("winter-reads")
        .await
        .unwrap()
        .expect("list by slug");
    assert_eq!(reloaded.total_books, 1);
}

#[tokio::test]
async fn test_reading_list_rename_keeps_slug() {
    let (state, _media) = setup_state().await;

    let list = state
        .reading_list_repo
        .create(TermInput::named("Holiday"))
        .await
        .unwrap();
    let renamed = state
        .reading_list_repo
        .rename(list.id, "Holidays 2026".to_string())
        .await
        .unwrap();

    assert_eq!(renamed.name, "Holidays 2026");
    assert_eq!(renamed.slug, "holiday");

    let duplicate = state
        .reading_list_repo
        .create(TermInput::named("Holidays 2026"))
        .await;
    assert!(matches!(duplicate, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn test_memberships_cascade_from_both_sides() {
    let (state, _media) = setup_state().await;

    let list = state
        .reading_list_repo
        .create(TermInput::named("Shortlist"))
        .await
        .unwrap();
    let book = state
        .book_repo
        .create(BookInput::titled("Solaris"))
        .await
        .unwrap();
    state.reading_list_repo.add_book(list.id, book.id).await.unwrap();

    state.book_repo.delete(book.id).await.unwrap();
    assert!(state.reading_list_repo.books(list.id).await.unwrap().is_empty());

    let kept = state
        .book_repo
        .create(BookInput::titled("Roadside Picnic"))
        .await
        .unwrap();
    state.reading_list_repo.add_book(list.id, kept.id).await.unwrap();
    state.reading_list_repo.delete(list.id).await.unwrap();

    assert!(state.book_repo.find_by_id(kept.id).await.unwrap().is_some());
    assert!(matches!(
        state.reading_list_repo.books(list.id).await,
        Err(DomainError::NotFound)
    ));
}

#[tokio::test]
async fn test_add_unknown_book_is_rejected() {
    let (state, _media) = setup_state().await;

    let list = state
        .reading_list_repo
        .create(TermInput::named("Ghosts"))
        .await
        .unwrap();
    let result = state.reading_list_repo.add_book(list.id, 77).await;
    assert!(matches!(result, Err(DomainError::Reference(_))));
}
