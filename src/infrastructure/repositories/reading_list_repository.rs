//! SeaORM implementation of ReadingListRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{DomainError, ReadingList, ReadingListEntry, ReadingListRepository, TermInput};
use crate::models::book::Entity as BookEntity;
use crate::models::reading_list::{self, ActiveModel, Column, Entity as ReadingListEntity};
use crate::models::reading_list_books::{
    self, ActiveModel as ReadingListBookActiveModel, Entity as ReadingListBookEntity,
};
use crate::utils::{now_timestamp, slug, validate};

/// SeaORM-based implementation of ReadingListRepository
pub struct SeaOrmReadingListRepository {
    db: DatabaseConnection,
}

impl SeaOrmReadingListRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn with_count(&self, model: reading_list::Model) -> Result<ReadingList, DomainError> {
        let total = ReadingListBookEntity::find()
            .filter(reading_list_books::Column::ReadingListId.eq(model.id))
            .count(&self.db)
            .await?;

        Ok(ReadingList {
            id: model.id,
            name: model.name,
            slug: model.slug,
            total_books: total,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    async fn require_list(&self, id: i32) -> Result<reading_list::Model, DomainError> {
        ReadingListEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    validate::require_present("name", name)?;
    validate::max_len("name", name, 255)
}

#[async_trait]
impl ReadingListRepository for SeaOrmReadingListRepository {
    async fn find_all(&self) -> Result<Vec<ReadingList>, DomainError> {
        let lists = ReadingListEntity::find()
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await?;

        let mut result = Vec::with_capacity(lists.len());
        for list in lists {
            result.push(self.with_count(list).await?);
        }
        Ok(result)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<ReadingList>, DomainError> {
        match ReadingListEntity::find_by_id(id).one(&self.db).await? {
            Some(list) => Ok(Some(self.with_count(list).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<ReadingList>, DomainError> {
        let list = ReadingListEntity::find()
            .filter(Column::Slug.eq(slug))
            .one(&self.db)
            .await?;

        match list {
            Some(list) => Ok(Some(self.with_count(list).await?)),
            None => Ok(None),
        }
    }

    async fn create(&self, input: TermInput) -> Result<ReadingList, DomainError> {
        let name = input.name.trim().to_string();
        validate_name(&name)?;
        let slug = slug::assign_slug(input.slug.as_deref(), &name)?;
        let now = now_timestamp();

        let new_list = ActiveModel {
            name: Set(name),
            slug: Set(slug),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = new_list.insert(&self.db).await?;
        tracing::info!("Created reading list '{}' ({})", model.name, model.slug);

        Ok(ReadingList {
            id: model.id,
            name: model.name,
            slug: model.slug,
            total_books: 0,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    async fn rename(&self, id: i32, name: String) -> Result<ReadingList, DomainError> {
        let name = name.trim().to_string();
        validate_name(&name)?;

        let mut active: ActiveModel = self.require_list(id).await?.into();
        active.name = Set(name);
        active.updated_at = Set(now_timestamp());

        let model = active.update(&self.db).await?;
        self.with_count(model).await
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = ReadingListEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Deleted reading list {}", id);
        Ok(())
    }

    async fn books(&self, list_id: i32) -> Result<Vec<ReadingListEntry>, DomainError> {
        self.require_list(list_id).await?;

        let rows = ReadingListBookEntity::find()
            .filter(reading_list_books::Column::ReadingListId.eq(list_id))
            .order_by_asc(reading_list_books::Column::Id)
            .find_also_related(BookEntity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, book)| book)
            .map(|book| ReadingListEntry {
                book_id: book.id,
                display_name: book.display_name(),
                slug: book.slug,
            })
            .collect())
    }

    async fn add_book(&self, list_id: i32, book_id: i32) -> Result<(), DomainError> {
        // Check if already exists
        let existing = ReadingListBookEntity::find()
            .filter(reading_list_books::Column::ReadingListId.eq(list_id))
            .filter(reading_list_books::Column::BookId.eq(book_id))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Ok(()); // Already a member, idempotent
        }

        let entry = ReadingListBookActiveModel {
            book_id: Set(book_id),
            reading_list_id: Set(list_id),
            ..Default::default()
        };

        // Unknown list or book ids surface as referential violations
        entry.insert(&self.db).await?;
        tracing::debug!("Added book {} to reading list {}", book_id, list_id);
        Ok(())
    }

    async fn remove_book(&self, list_id: i32, book_id: i32) -> Result<(), DomainError> {
        let result = reading_list_books::Entity::delete_many()
            .filter(reading_list_books::Column::ReadingListId.eq(list_id))
            .filter(reading_list_books::Column::BookId.eq(book_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
