//! Repository implementations using SeaORM

pub mod asset_repository;
pub mod book_repository;
pub mod reading_list_repository;
pub mod taxonomy_repository;

pub use asset_repository::SeaOrmAssetRepository;
pub use book_repository::SeaOrmBookRepository;
pub use reading_list_repository::SeaOrmReadingListRepository;
pub use taxonomy_repository::SeaOrmTaxonomyRepository;
