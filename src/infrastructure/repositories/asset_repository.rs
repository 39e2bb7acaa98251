//! SeaORM implementation of AssetRepository
//!
//! Derived columns are recomputed from the content on every save and the
//! blob is written inside the row's transaction, so a failed upload leaves
//! no row behind and a duplicate hash never reaches storage.

use std::io::{Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::domain::{Asset, AssetRepository, AssetUpdate, AssetUpload, DomainError};
use crate::models::asset::{self, ActiveModel, Column, Entity as AssetEntity};
use crate::models::book::Entity as BookEntity;
use crate::storage::BlobStore;
use crate::utils::fingerprint::Fingerprint;
use crate::utils::now_timestamp;

/// SeaORM-based implementation of AssetRepository
pub struct SeaOrmAssetRepository {
    db: DatabaseConnection,
    store: Arc<dyn BlobStore>,
}

impl SeaOrmAssetRepository {
    pub fn new(db: DatabaseConnection, store: Arc<dyn BlobStore>) -> Self {
        Self { db, store }
    }

    async fn book_display_name(&self, book_id: i32) -> Result<String, DomainError> {
        let book = BookEntity::find_by_id(book_id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;
        Ok(book.display_name())
    }
}

/// Fingerprint an upload, then read its full content for storage
fn fingerprint_upload(
    mut upload: AssetUpload,
    display_name: &str,
) -> Result<(Fingerprint, Vec<u8>), DomainError> {
    let fingerprint = Fingerprint::compute(&mut *upload.content, &upload.file_name, display_name)?;

    // Store the full content, not just what follows the caller's position
    upload.content.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::with_capacity(fingerprint.file_size as usize);
    upload.content.read_to_end(&mut bytes)?;
    if bytes.len() as u64 != fingerprint.file_size {
        return Err(DomainError::Internal(format!(
            "content of '{}' changed while it was being stored",
            upload.file_name
        )));
    }

    Ok((fingerprint, bytes))
}

fn to_asset(model: asset::Model) -> Asset {
    Asset {
        id: model.id,
        book_id: model.book_id,
        file: model.file,
        file_name: model.file_name,
        file_extension: model.file_extension,
        file_size: model.file_size,
        file_hash: model.file_hash,
        created_at: model.created_at,
    }
}

#[async_trait]
impl AssetRepository for SeaOrmAssetRepository {
    async fn find_by_book(&self, book_id: i32) -> Result<Vec<Asset>, DomainError> {
        let assets = AssetEntity::find()
            .filter(Column::BookId.eq(book_id))
            .order_by_asc(Column::FileExtension)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await?;

        Ok(assets.into_iter().map(to_asset).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Asset>, DomainError> {
        let asset = AssetEntity::find_by_id(id).one(&self.db).await?;
        Ok(asset.map(to_asset))
    }

    async fn create(&self, book_id: i32, upload: AssetUpload) -> Result<Asset, DomainError> {
        let display_name = self.book_display_name(book_id).await?;
        let (fingerprint, bytes) = fingerprint_upload(upload, &display_name)?;
        let key = fingerprint.storage_key();

        tracing::debug!(
            "Fingerprinted asset for book {}: {} bytes, sha256 {}",
            book_id,
            fingerprint.file_size,
            fingerprint.file_hash
        );

        let txn = self.db.begin().await?;

        let new_asset = ActiveModel {
            book_id: Set(book_id),
            file: Set(key.clone()),
            file_name: Set(fingerprint.file_name),
            file_extension: Set(fingerprint.file_extension),
            file_size: Set(fingerprint.file_size as i64),
            file_hash: Set(fingerprint.file_hash),
            created_at: Set(now_timestamp()),
            ..Default::default()
        };

        // A duplicate hash fails here, before anything is written to storage
        let model = new_asset.insert(&txn).await?;
        self.store.put(&key, &bytes).await?;
        txn.commit().await?;

        tracing::info!("Stored asset {} ({}) for book {}", model.id, model.file_name, book_id);
        Ok(to_asset(model))
    }

    async fn update(&self, id: i32, update: AssetUpdate) -> Result<Asset, DomainError> {
        let existing = AssetEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let book_id = update.book_id.unwrap_or(existing.book_id);
        let display_name = self.book_display_name(book_id).await?;

        // Without a new upload the stored content is fingerprinted again
        let upload = match update.upload {
            Some(upload) => upload,
            None => {
                let bytes = self.store.get(&existing.file).await?;
                AssetUpload::new(existing.file.clone(), Cursor::new(bytes))
            }
        };
        let (fingerprint, bytes) = fingerprint_upload(upload, &display_name)?;
        let key = fingerprint.storage_key();

        let txn = self.db.begin().await?;

        let old_key = existing.file.clone();
        let mut active: ActiveModel = existing.into();
        active.book_id = Set(book_id);
        active.file = Set(key.clone());
        active.file_name = Set(fingerprint.file_name);
        active.file_extension = Set(fingerprint.file_extension);
        active.file_size = Set(fingerprint.file_size as i64);
        active.file_hash = Set(fingerprint.file_hash);

        let model = active.update(&txn).await?;
        // Keys are content addressed: same key, same bytes
        if key != old_key {
            self.store.put(&key, &bytes).await?;
        }
        txn.commit().await?;

        if key != old_key
            && let Err(e) = self.store.delete(&old_key).await
        {
            tracing::warn!("Could not remove replaced blob {}: {}", old_key, e);
        }

        tracing::info!("Saved asset {} ({})", model.id, model.file_name);
        Ok(to_asset(model))
    }

    async fn read(&self, id: i32) -> Result<Vec<u8>, DomainError> {
        let asset = AssetEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        Ok(self.store.get(&asset.file).await?)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let asset = AssetEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        AssetEntity::delete_by_id(id).exec(&self.db).await?;

        if let Err(e) = self.store.delete(&asset.file).await {
            tracing::warn!("Could not remove blob {} of asset {}: {}", asset.file, id, e);
        }

        tracing::info!("Deleted asset {} ({})", id, asset.file_name);
        Ok(())
    }
}
