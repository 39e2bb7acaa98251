//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{
    AssetRepository, BookRepository, ReadingListRepository, TaxonomyKind, TaxonomyRepository,
};
use crate::infrastructure::{
    SeaOrmAssetRepository, SeaOrmBookRepository, SeaOrmReadingListRepository,
    SeaOrmTaxonomyRepository,
};
use crate::storage::BlobStore;

/// Application state shared by every caller of the catalog
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    store: Arc<dyn BlobStore>,
    pub authors: Arc<dyn TaxonomyRepository>,
    pub categories: Arc<dyn TaxonomyRepository>,
    pub publishers: Arc<dyn TaxonomyRepository>,
    pub recommenders: Arc<dyn TaxonomyRepository>,
    pub tags: Arc<dyn TaxonomyRepository>,
    /// Book repository
    pub book_repo: Arc<dyn BookRepository>,
    /// Asset repository
    pub asset_repo: Arc<dyn AssetRepository>,
    /// Reading list repository
    pub reading_list_repo: Arc<dyn ReadingListRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection, store: Arc<dyn BlobStore>) -> Self {
        let taxonomy = |kind: TaxonomyKind| -> Arc<dyn TaxonomyRepository> {
            Arc::new(SeaOrmTaxonomyRepository::new(db.clone(), kind))
        };

        Self {
            authors: taxonomy(TaxonomyKind::Author),
            categories: taxonomy(TaxonomyKind::Category),
            publishers: taxonomy(TaxonomyKind::Publisher),
            recommenders: taxonomy(TaxonomyKind::Recommender),
            tags: taxonomy(TaxonomyKind::Tag),
            book_repo: Arc::new(SeaOrmBookRepository::new(db.clone(), store.clone())),
            asset_repo: Arc::new(SeaOrmAssetRepository::new(db.clone(), store.clone())),
            reading_list_repo: Arc::new(SeaOrmReadingListRepository::new(db.clone())),
            db,
            store,
        }
    }

    /// Repository for one kind of taxonomy term
    pub fn taxonomy(&self, kind: TaxonomyKind) -> &Arc<dyn TaxonomyRepository> {
        match kind {
            TaxonomyKind::Author => &self.authors,
            TaxonomyKind::Category => &self.categories,
            TaxonomyKind::Publisher => &self.publishers,
            TaxonomyKind::Recommender => &self.recommenders,
            TaxonomyKind::Tag => &self.tags,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn store(&self) -> &dyn BlobStore {
        self.store.as_ref()
    }
}

impl AsRef<DatabaseConnection> for AppState {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.db
    }
}
