//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use std::fmt;
use std::io::{Read, Seek};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;

/// The five flat taxonomies a book can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyKind {
    Author,
    Category,
    Publisher,
    Recommender,
    Tag,
}

impl TaxonomyKind {
    pub const ALL: [TaxonomyKind; 5] = [
        TaxonomyKind::Author,
        TaxonomyKind::Category,
        TaxonomyKind::Publisher,
        TaxonomyKind::Recommender,
        TaxonomyKind::Tag,
    ];

    /// Maximum length of the `name` column.
    pub fn max_name_len(self) -> usize {
        match self {
            TaxonomyKind::Publisher => 100,
            _ => 255,
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            TaxonomyKind::Author => "authors",
            TaxonomyKind::Category => "categories",
            TaxonomyKind::Publisher => "publishers",
            TaxonomyKind::Recommender => "recommenders",
            TaxonomyKind::Tag => "tags",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaxonomyKind::Author => "author",
            TaxonomyKind::Category => "category",
            TaxonomyKind::Publisher => "publisher",
            TaxonomyKind::Recommender => "recommender",
            TaxonomyKind::Tag => "tag",
        };
        f.write_str(label)
    }
}

/// A row of any taxonomy table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: i32,
    pub kind: TaxonomyKind,
    pub name: String,
    pub slug: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a taxonomy term or reading list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermInput {
    pub name: String,
    /// Explicit slug; derived from `name` when absent or blank
    pub slug: Option<String>,
}

impl TermInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
        }
    }
}

/// Repository trait for the taxonomy tables
#[async_trait]
pub trait TaxonomyRepository: Send + Sync {
    /// Which taxonomy this repository serves
    fn kind(&self) -> TaxonomyKind;

    /// Find all terms, ordered by name
    async fn find_all(&self) -> Result<Vec<Term>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Term>, DomainError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Term>, DomainError>;

    /// Create a new term, deriving its slug when none is given
    async fn create(&self, input: TermInput) -> Result<Term, DomainError>;

    /// Change the display name; the slug is left untouched
    async fn rename(&self, id: i32, name: String) -> Result<Term, DomainError>;

    /// Delete a term by ID
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Filter criteria for book queries
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    pub title: Option<String>,
    pub is_read: Option<bool>,
    pub is_beta: Option<bool>,
    pub i_wish_it: Option<bool>,
    pub publication_year: Option<i32>,
    pub author: Option<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub recommender: Option<String>,
    pub publisher: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Book fields as supplied by a caller
///
/// The `*_ids` vectors replace the book's links when present; on create a
/// missing vector means "no links".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookInput {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub edition: String,
    #[serde(default)]
    pub volume: String,
    pub publisher_id: Option<i32>,
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub has_physical_copy: bool,
    #[serde(default)]
    pub is_beta: bool,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub i_wish_it: bool,
    #[serde(default)]
    pub read_it_again: bool,
    #[serde(default)]
    pub notes: String,
    pub slug: Option<String>,
    pub author_ids: Option<Vec<i32>>,
    pub tag_ids: Option<Vec<i32>>,
    pub category_ids: Option<Vec<i32>>,
    pub recommender_ids: Option<Vec<i32>>,
}

impl BookInput {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Book data for callers, with its links resolved
#[derive(Debug, Clone, Serialize)]
pub struct BookDetails {
    pub id: i32,
    pub display_name: String,
    pub title: String,
    pub subtitle: String,
    pub edition: String,
    pub volume: String,
    pub publisher: Option<Term>,
    pub publication_year: Option<i32>,
    pub cover_image: Option<String>,
    pub has_physical_copy: bool,
    pub is_beta: bool,
    pub is_read: bool,
    pub i_wish_it: bool,
    pub read_it_again: bool,
    pub notes: String,
    pub slug: String,
    pub authors: Vec<Term>,
    pub tags: Vec<Term>,
    pub categories: Vec<Term>,
    pub recommenders: Vec<Term>,
    pub created_at: String,
    pub updated_at: String,
}

/// Paginated result with total count
#[derive(Debug)]
pub struct PaginatedBooks {
    pub books: Vec<BookDetails>,
    pub total: u64,
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books matching the filter criteria, newest first
    async fn find_all(&self, filter: BookFilter) -> Result<PaginatedBooks, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<BookDetails>, DomainError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BookDetails>, DomainError>;

    /// Create a new book with its links
    async fn create(&self, input: BookInput) -> Result<BookDetails, DomainError>;

    /// Update an existing book; the slug never changes
    async fn update(&self, id: i32, input: BookInput) -> Result<BookDetails, DomainError>;

    /// Delete a book, its assets and its reading-list memberships
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Anything an asset payload can be read from
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// A file handed over for storage as a book asset
pub struct AssetUpload {
    /// Name of the uploaded file; only its extension is kept
    pub file_name: String,
    pub content: Box<dyn ReadSeek>,
}

impl AssetUpload {
    pub fn new(file_name: impl Into<String>, content: impl ReadSeek + 'static) -> Self {
        Self {
            file_name: file_name.into(),
            content: Box::new(content),
        }
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(file_name, std::io::Cursor::new(bytes))
    }
}

impl fmt::Debug for AssetUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetUpload")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Changes applied when an asset is saved again
#[derive(Debug, Default)]
pub struct AssetUpdate {
    /// Move the asset to another book
    pub book_id: Option<i32>,
    /// Replace the stored file
    pub upload: Option<AssetUpload>,
}

/// Asset data for callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub id: i32,
    pub book_id: i32,
    pub file: String,
    pub file_name: String,
    pub file_extension: String,
    pub file_size: i64,
    pub file_hash: String,
    pub created_at: String,
}

/// Repository trait for book assets
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Assets of a book, ordered by file extension
    async fn find_by_book(&self, book_id: i32) -> Result<Vec<Asset>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Asset>, DomainError>;

    /// Fingerprint and store a new asset
    async fn create(&self, book_id: i32, upload: AssetUpload) -> Result<Asset, DomainError>;

    /// Save an asset again, recomputing every derived field
    async fn update(&self, id: i32, update: AssetUpdate) -> Result<Asset, DomainError>;

    /// Read the stored content of an asset
    async fn read(&self, id: i32) -> Result<Vec<u8>, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Reading list data for callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingList {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub total_books: u64,
    pub created_at: String,
    pub updated_at: String,
}

/// A member of a reading list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingListEntry {
    pub book_id: i32,
    pub display_name: String,
    pub slug: String,
}

/// Repository trait for reading lists
#[async_trait]
pub trait ReadingListRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<ReadingList>, DomainError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<ReadingList>, DomainError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ReadingList>, DomainError>;

    async fn create(&self, input: TermInput) -> Result<ReadingList, DomainError>;

    async fn rename(&self, id: i32, name: String) -> Result<ReadingList, DomainError>;

    async fn delete(&self, id: i32) -> Result<(), DomainError>;

    /// Books of a list in the order they were added
    async fn books(&self, list_id: i32) -> Result<Vec<ReadingListEntry>, DomainError>;

    /// Add a book; adding it twice is a no-op
    async fn add_book(&self, list_id: i32, book_id: i32) -> Result<(), DomainError>;

    async fn remove_book(&self, list_id: i32, book_id: i32) -> Result<(), DomainError>;
}
