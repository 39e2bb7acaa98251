//! SeaORM implementation of BookRepository

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::taxonomy_repository::to_term;
use crate::domain::{
    BookDetails, BookFilter, BookInput, BookRepository, DomainError, PaginatedBooks, TaxonomyKind,
};
use crate::models::book::{self, ActiveModel, Column, Entity as BookEntity};
use crate::models::{
    asset, author, book_authors, book_categories, book_recommenders, book_tags, category,
    publisher, recommender, tag,
};
use crate::services::cover_service;
use crate::storage::BlobStore;
use crate::utils::{now_timestamp, slug, validate};

/// Replace the rows of one book junction table when new ids were supplied
macro_rules! replace_links {
    ($conn:expr, $book_id:expr, $ids:expr, $join:ident, $column:ident) => {
        if let Some(ids) = $ids {
            $join::Entity::delete_many()
                .filter($join::Column::BookId.eq($book_id))
                .exec($conn)
                .await?;
            for id in ids.iter().copied().collect::<BTreeSet<i32>>() {
                $join::ActiveModel {
                    book_id: Set($book_id),
                    $column: Set(id),
                }
                .insert($conn)
                .await?;
            }
        }
    };
}

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
    store: Arc<dyn BlobStore>,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection, store: Arc<dyn BlobStore>) -> Self {
        Self { db, store }
    }
}

/// Trimmed and validated copy of the caller's text fields
struct BookFields {
    title: String,
    subtitle: String,
    edition: String,
    volume: String,
}

impl BookFields {
    fn from_input(input: &BookInput) -> Result<Self, DomainError> {
        let fields = Self {
            title: input.title.trim().to_string(),
            subtitle: input.subtitle.trim().to_string(),
            edition: input.edition.trim().to_string(),
            volume: input.volume.trim().to_string(),
        };

        validate::require_present("title", &fields.title)?;
        validate::max_len("title", &fields.title, 255)?;
        validate::max_len("subtitle", &fields.subtitle, 255)?;
        validate::max_len("edition", &fields.edition, 20)?;
        validate::max_len("volume", &fields.volume, 20)?;
        validate::publication_year(input.publication_year)?;

        Ok(fields)
    }

    fn display_name(&self) -> String {
        book::display_name(&self.title, &self.subtitle, &self.edition, &self.volume)
    }
}

async fn replace_all_links<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
    input: &BookInput,
) -> Result<(), DomainError> {
    replace_links!(conn, book_id, &input.author_ids, book_authors, author_id);
    replace_links!(conn, book_id, &input.tag_ids, book_tags, tag_id);
    replace_links!(conn, book_id, &input.category_ids, book_categories, category_id);
    replace_links!(
        conn,
        book_id,
        &input.recommender_ids,
        book_recommenders,
        recommender_id
    );
    Ok(())
}

/// Resolve the links of a book into a `BookDetails`
pub(crate) async fn load_details<C: ConnectionTrait>(
    conn: &C,
    model: book::Model,
) -> Result<BookDetails, DomainError> {
    let authors = model
        .find_related(author::Entity)
        .order_by_asc(author::Column::Name)
        .all(conn)
        .await?;
    let tags = model
        .find_related(tag::Entity)
        .order_by_asc(tag::Column::Name)
        .all(conn)
        .await?;
    let categories = model
        .find_related(category::Entity)
        .order_by_asc(category::Column::Name)
        .all(conn)
        .await?;
    let recommenders = model
        .find_related(recommender::Entity)
        .order_by_asc(recommender::Column::Name)
        .all(conn)
        .await?;
    let publisher = match model.publisher_id {
        Some(id) => publisher::Entity::find_by_id(id).one(conn).await?,
        None => None,
    };

    Ok(BookDetails {
        id: model.id,
        display_name: model.display_name(),
        publisher: publisher.map(|p| to_term!(TaxonomyKind::Publisher, p)),
        authors: authors
            .into_iter()
            .map(|a| to_term!(TaxonomyKind::Author, a))
            .collect(),
        tags: tags
            .into_iter()
            .map(|t| to_term!(TaxonomyKind::Tag, t))
            .collect(),
        categories: categories
            .into_iter()
            .map(|c| to_term!(TaxonomyKind::Category, c))
            .collect(),
        recommenders: recommenders
            .into_iter()
            .map(|r| to_term!(TaxonomyKind::Recommender, r))
            .collect(),
        title: model.title,
        subtitle: model.subtitle,
        edition: model.edition,
        volume: model.volume,
        publication_year: model.publication_year,
        cover_image: model.cover_image,
        has_physical_copy: model.has_physical_copy,
        is_beta: model.is_beta,
        is_read: model.is_read,
        i_wish_it: model.i_wish_it,
        read_it_again: model.read_it_again,
        notes: model.notes,
        slug: model.slug,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self, filter: BookFilter) -> Result<PaginatedBooks, DomainError> {
        let mut query = BookEntity::find();

        // Apply filters
        if let Some(title) = &filter.title
            && !title.is_empty()
        {
            query = query.filter(Column::Title.contains(title));
        }
        if let Some(is_read) = filter.is_read {
            query = query.filter(Column::IsRead.eq(is_read));
        }
        if let Some(is_beta) = filter.is_beta {
            query = query.filter(Column::IsBeta.eq(is_beta));
        }
        if let Some(i_wish_it) = filter.i_wish_it {
            query = query.filter(Column::IWishIt.eq(i_wish_it));
        }
        if let Some(year) = filter.publication_year {
            query = query.filter(Column::PublicationYear.eq(year));
        }

        // Related-term filters match on slug; slugs are unique so each join
        // yields at most one row per book.
        if let Some(slug) = &filter.author {
            query = query
                .inner_join(author::Entity)
                .filter(author::Column::Slug.eq(slug.as_str()));
        }
        if let Some(slug) = &filter.tag {
            query = query
                .inner_join(tag::Entity)
                .filter(tag::Column::Slug.eq(slug.as_str()));
        }
        if let Some(slug) = &filter.category {
            query = query
                .inner_join(category::Entity)
                .filter(category::Column::Slug.eq(slug.as_str()));
        }
        if let Some(slug) = &filter.recommender {
            query = query
                .inner_join(recommender::Entity)
                .filter(recommender::Column::Slug.eq(slug.as_str()));
        }
        if let Some(slug) = &filter.publisher {
            query = query
                .inner_join(publisher::Entity)
                .filter(publisher::Column::Slug.eq(slug.as_str()));
        }

        // Newest first; ids break ties between identical timestamps
        query = query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let (books, total) = if let Some(limit) = filter.limit {
            let page = filter.page.unwrap_or(0);
            let paginator = query.paginate(&self.db, limit.max(1));
            let total = paginator.num_items().await?;
            let items = paginator.fetch_page(page).await?;
            (items, total)
        } else {
            let items = query.all(&self.db).await?;
            let total = items.len() as u64;
            (items, total)
        };

        tracing::debug!("Book query matched {} of {} books", books.len(), total);

        let mut details = Vec::with_capacity(books.len());
        for model in books {
            details.push(load_details(&self.db, model).await?);
        }

        Ok(PaginatedBooks {
            books: details,
            total,
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<BookDetails>, DomainError> {
        match BookEntity::find_by_id(id).one(&self.db).await? {
            Some(model) => Ok(Some(load_details(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<BookDetails>, DomainError> {
        let model = BookEntity::find()
            .filter(Column::Slug.eq(slug))
            .one(&self.db)
            .await?;

        match model {
            Some(model) => Ok(Some(load_details(&self.db, model).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, input: BookInput) -> Result<BookDetails, DomainError> {
        let fields = BookFields::from_input(&input)?;
        let display = fields.display_name();
        let slug = slug::assign_slug(input.slug.as_deref(), &display)?;
        let now = now_timestamp();

        let txn = self.db.begin().await?;

        let new_book = ActiveModel {
            title: Set(fields.title),
            subtitle: Set(fields.subtitle),
            edition: Set(fields.edition),
            volume: Set(fields.volume),
            publisher_id: Set(input.publisher_id),
            publication_year: Set(input.publication_year),
            cover_image: Set(None),
            has_physical_copy: Set(input.has_physical_copy),
            is_beta: Set(input.is_beta),
            is_read: Set(input.is_read),
            i_wish_it: Set(input.i_wish_it),
            read_it_again: Set(input.read_it_again),
            notes: Set(input.notes.clone()),
            slug: Set(slug),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = new_book.insert(&txn).await?;
        replace_all_links(&txn, model.id, &input).await?;
        let details = load_details(&txn, model).await?;

        txn.commit().await?;

        tracing::info!("Created book '{}' ({})", details.display_name, details.slug);
        Ok(details)
    }

    async fn update(&self, id: i32, input: BookInput) -> Result<BookDetails, DomainError> {
        let fields = BookFields::from_input(&input)?;

        let txn = self.db.begin().await?;

        let existing = BookEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(DomainError::NotFound)?;

        // The slug is fixed at creation and deliberately not touched here
        let mut active: ActiveModel = existing.into();
        active.title = Set(fields.title);
        active.subtitle = Set(fields.subtitle);
        active.edition = Set(fields.edition);
        active.volume = Set(fields.volume);
        active.publisher_id = Set(input.publisher_id);
        active.publication_year = Set(input.publication_year);
        active.has_physical_copy = Set(input.has_physical_copy);
        active.is_beta = Set(input.is_beta);
        active.is_read = Set(input.is_read);
        active.i_wish_it = Set(input.i_wish_it);
        active.read_it_again = Set(input.read_it_again);
        active.notes = Set(input.notes.clone());
        active.updated_at = Set(now_timestamp());

        let model = active.update(&txn).await?;
        replace_all_links(&txn, model.id, &input).await?;
        let details = load_details(&txn, model).await?;

        txn.commit().await?;

        tracing::info!("Updated book {} ('{}')", id, details.display_name);
        Ok(details)
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let Some(existing) = BookEntity::find_by_id(id).one(&self.db).await? else {
            return Err(DomainError::NotFound);
        };

        let mut blob_keys: Vec<String> = existing
            .find_related(asset::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| a.file)
            .collect();
        if let Some(cover) = &existing.cover_image {
            blob_keys.push(cover.clone());
            blob_keys.push(cover_service::thumbnail_key(&existing.slug));
        }

        // Assets and reading-list rows go with the book through ON DELETE CASCADE
        let result = BookEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        for key in blob_keys {
            if let Err(e) = self.store.delete(&key).await {
                tracing::warn!("Could not remove blob {} of deleted book {}: {}", key, id, e);
            }
        }

        tracing::info!("Deleted book {} ('{}')", id, existing.display_name());
        Ok(())
    }
}
