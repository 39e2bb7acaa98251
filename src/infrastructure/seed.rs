//! Demo catalog for a fresh database

use crate::domain::{BookFilter, BookInput, DomainError, Term, TermInput};
use crate::infrastructure::AppState;

/// Find a term by name or create it
async fn term(
    repo: &dyn crate::domain::TaxonomyRepository,
    name: &str,
) -> Result<Term, DomainError> {
    let slug = crate::utils::slug::slugify(name);
    if let Some(existing) = repo.find_by_slug(&slug).await? {
        return Ok(existing);
    }
    repo.create(TermInput::named(name)).await
}

/// Populate an empty catalog with a handful of books. Does nothing when
/// books already exist.
pub async fn seed_demo_data(state: &AppState) -> Result<(), DomainError> {
    let existing = state
        .book_repo
        .find_all(BookFilter {
            limit: Some(1),
            ..Default::default()
        })
        .await?;
    if existing.total > 0 {
        tracing::debug!("Catalog already holds {} books, not seeding", existing.total);
        return Ok(());
    }

    let tolkien = term(state.authors.as_ref(), "J.R.R. Tolkien").await?;
    let asimov = term(state.authors.as_ref(), "Isaac Asimov").await?;
    let herbert = term(state.authors.as_ref(), "Frank Herbert").await?;

    let fantasy = term(state.tags.as_ref(), "Fantasy").await?;
    let sci_fi = term(state.tags.as_ref(), "Sci-Fi").await?;
    let classic = term(state.tags.as_ref(), "Classic").await?;

    let fiction = term(state.categories.as_ref(), "Fiction").await?;
    let ace = term(state.publishers.as_ref(), "Ace Books").await?;
    let allen = term(state.publishers.as_ref(), "Allen & Unwin").await?;

    let books = [
        ("Dune", "", Some(ace.id), 1965, vec![herbert.id], vec![sci_fi.id, classic.id]),
        ("Foundation", "", None, 1951, vec![asimov.id], vec![sci_fi.id]),
        (
            "The Lord of the Rings",
            "The Fellowship of the Ring",
            Some(allen.id),
            1954,
            vec![tolkien.id],
            vec![fantasy.id, classic.id],
        ),
    ];

    let mut created = Vec::new();
    for (title, subtitle, publisher_id, year, author_ids, tag_ids) in books {
        let book = state
            .book_repo
            .create(BookInput {
                subtitle: subtitle.to_string(),
                publisher_id,
                publication_year: Some(year),
                author_ids: Some(author_ids),
                tag_ids: Some(tag_ids),
                category_ids: Some(vec![fiction.id]),
                ..BookInput::titled(title)
            })
            .await?;
        created.push(book);
    }

    let list = state
        .reading_list_repo
        .create(TermInput::named("Summer reading"))
        .await?;
    for book in &created {
        state.reading_list_repo.add_book(list.id, book.id).await?;
    }

    tracing::info!("Seeded {} demo books", created.len());
    Ok(())
}
