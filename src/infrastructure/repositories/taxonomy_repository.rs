//! SeaORM implementation of TaxonomyRepository
//!
//! The five taxonomy tables share one shape, so a single repository serves
//! them all and dispatches on its `TaxonomyKind`.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::domain::{DomainError, TaxonomyKind, TaxonomyRepository, Term, TermInput};
use crate::utils::{now_timestamp, slug, validate};

/// Run `$body` with `$m` bound to the entity module of `$kind`.
macro_rules! with_taxonomy {
    ($kind:expr, $m:ident => $body:expr) => {
        match $kind {
            TaxonomyKind::Author => {
                use crate::models::author as $m;
                $body
            }
            TaxonomyKind::Category => {
                use crate::models::category as $m;
                $body
            }
            TaxonomyKind::Publisher => {
                use crate::models::publisher as $m;
                $body
            }
            TaxonomyKind::Recommender => {
                use crate::models::recommender as $m;
                $body
            }
            TaxonomyKind::Tag => {
                use crate::models::tag as $m;
                $body
            }
        }
    };
}

/// Build a `Term` from any taxonomy model
macro_rules! to_term {
    ($kind:expr, $model:expr) => {{
        let model = $model;
        $crate::domain::Term {
            id: model.id,
            kind: $kind,
            name: model.name,
            slug: model.slug,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }};
}

pub(crate) use to_term;

/// SeaORM-based implementation of TaxonomyRepository
pub struct SeaOrmTaxonomyRepository {
    db: DatabaseConnection,
    kind: TaxonomyKind,
}

impl SeaOrmTaxonomyRepository {
    pub fn new(db: DatabaseConnection, kind: TaxonomyKind) -> Self {
        Self { db, kind }
    }

    fn validate_name(&self, name: &str) -> Result<(), DomainError> {
        validate::require_present("name", name)?;
        validate::max_len("name", name, self.kind.max_name_len())
    }
}

#[async_trait]
impl TaxonomyRepository for SeaOrmTaxonomyRepository {
    fn kind(&self) -> TaxonomyKind {
        self.kind
    }

    async fn find_all(&self) -> Result<Vec<Term>, DomainError> {
        let kind = self.kind;
        with_taxonomy!(kind, m => {
            let rows = m::Entity::find()
                .order_by_asc(m::Column::Name)
                .all(&self.db)
                .await?;
            Ok(rows.into_iter().map(|row| to_term!(kind, row)).collect())
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Term>, DomainError> {
        let kind = self.kind;
        with_taxonomy!(kind, m => {
            let row = m::Entity::find_by_id(id).one(&self.db).await?;
            Ok(row.map(|row| to_term!(kind, row)))
        })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Term>, DomainError> {
        let kind = self.kind;
        with_taxonomy!(kind, m => {
            let row = m::Entity::find()
                .filter(m::Column::Slug.eq(slug))
                .one(&self.db)
                .await?;
            Ok(row.map(|row| to_term!(kind, row)))
        })
    }

    async fn create(&self, input: TermInput) -> Result<Term, DomainError> {
        let kind = self.kind;
        let name = input.name.trim().to_string();
        self.validate_name(&name)?;
        let slug = slug::assign_slug(input.slug.as_deref(), &name)?;
        let now = now_timestamp();

        let term = with_taxonomy!(kind, m => {
            let row = m::ActiveModel {
                name: Set(name),
                slug: Set(slug),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&self.db)
            .await?;
            to_term!(kind, row)
        });

        tracing::info!("Created {} '{}' ({})", kind, term.name, term.slug);
        Ok(term)
    }

    async fn rename(&self, id: i32, name: String) -> Result<Term, DomainError> {
        let kind = self.kind;
        let name = name.trim().to_string();
        self.validate_name(&name)?;

        with_taxonomy!(kind, m => {
            let existing = m::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .ok_or(DomainError::NotFound)?;

            let mut active: m::ActiveModel = existing.into();
            active.name = Set(name);
            active.updated_at = Set(now_timestamp());

            let row = active.update(&self.db).await?;
            Ok(to_term!(kind, row))
        })
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let kind = self.kind;
        let rows_affected = with_taxonomy!(kind, m => {
            m::Entity::delete_by_id(id).exec(&self.db).await?.rows_affected
        });

        if rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Deleted {} {}", kind, id);
        Ok(())
    }
}
