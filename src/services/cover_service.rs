//! Cover images and their on-demand thumbnails
//!
//! The cover is stored under `cover_images/` and referenced from the book
//! row. Thumbnails are rendered the first time they are asked for and then
//! cached in the blob store next to the covers.

use std::path::Path;

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};

use crate::domain::DomainError;
use crate::models::book::{self, Entity as BookEntity};
use crate::storage::BlobStore;
use crate::utils::{now_timestamp, thumbnail};

/// Storage key of a book's cover, named after the book so covers never clash
pub fn cover_key(book_slug: &str, file_name: &str) -> Result<String, DomainError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            DomainError::Validation(format!("cover '{}' has no file extension", file_name))
        })?;
    Ok(format!("cover_images/{}.{}", book_slug, extension))
}

/// Storage key of a book's cached thumbnail
pub fn thumbnail_key(book_slug: &str) -> String {
    format!("cover_thumbnails/{}.webp", book_slug)
}

async fn require_book(db: &DatabaseConnection, book_id: i32) -> Result<book::Model, DomainError> {
    BookEntity::find_by_id(book_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound)
}

/// Store `bytes` as the cover of a book and return its storage key.
///
/// The content must decode as an image. Any previous cover and cached
/// thumbnail are discarded.
pub async fn set_cover_image(
    db: &DatabaseConnection,
    store: &dyn BlobStore,
    book_id: i32,
    file_name: &str,
    bytes: &[u8],
) -> Result<String, DomainError> {
    let existing = require_book(db, book_id).await?;
    let key = cover_key(&existing.slug, file_name)?;

    image::guess_format(bytes)?;
    image::load_from_memory(bytes)?;

    let previous = existing.cover_image.clone();
    let slug = existing.slug.clone();

    let txn = db.begin().await?;
    let mut active: book::ActiveModel = existing.into();
    active.cover_image = Set(Some(key.clone()));
    active.updated_at = Set(now_timestamp());
    // The blob is only written once the row update has gone through
    active.update(&txn).await?;
    store.put(&key, bytes).await?;
    txn.commit().await?;

    if let Some(previous) = previous
        && previous != key
        && let Err(e) = store.delete(&previous).await
    {
        tracing::warn!("Could not remove previous cover {}: {}", previous, e);
    }
    if let Err(e) = store.delete(&thumbnail_key(&slug)).await {
        tracing::warn!("Could not invalidate thumbnail of book {}: {}", book_id, e);
    }

    tracing::info!("Stored cover {} for book {}", key, book_id);
    Ok(key)
}

/// Drop the cover of a book along with its cached thumbnail.
pub async fn clear_cover_image(
    db: &DatabaseConnection,
    store: &dyn BlobStore,
    book_id: i32,
) -> Result<(), DomainError> {
    let existing = require_book(db, book_id).await?;
    let Some(cover) = existing.cover_image.clone() else {
        return Ok(());
    };
    let slug = existing.slug.clone();

    let mut active: book::ActiveModel = existing.into();
    active.cover_image = Set(None);
    active.updated_at = Set(now_timestamp());
    active.update(db).await?;

    for key in [cover, thumbnail_key(&slug)] {
        if let Err(e) = store.delete(&key).await {
            tracing::warn!("Could not remove {} of book {}: {}", key, book_id, e);
        }
    }
    Ok(())
}

/// WEBP thumbnail of a book's cover, or `None` when the book has no cover.
pub async fn cover_thumbnail(
    db: &DatabaseConnection,
    store: &dyn BlobStore,
    book_id: i32,
) -> Result<Option<Vec<u8>>, DomainError> {
    let existing = require_book(db, book_id).await?;
    let Some(cover) = existing.cover_image else {
        return Ok(None);
    };

    let key = thumbnail_key(&existing.slug);
    if store.exists(&key).await? {
        tracing::debug!("Serving cached thumbnail {}", key);
        return Ok(Some(store.get(&key).await?));
    }

    let source = store.get(&cover).await?;
    let rendered = tokio::task::spawn_blocking(move || thumbnail::render_thumbnail(&source))
        .await
        .map_err(|e| DomainError::Internal(format!("thumbnail task failed: {}", e)))??;

    store.put(&key, &rendered).await?;
    tracing::info!("Rendered thumbnail {} ({} bytes)", key, rendered.len());
    Ok(Some(rendered))
}
