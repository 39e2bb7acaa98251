use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    // Blank rather than NULL so (title, subtitle, edition, volume) stays unique
    pub subtitle: String,
    pub edition: String,
    pub volume: String,
    pub publisher_id: Option<i32>,
    pub publication_year: Option<i32>,
    /// Storage key of the cover image
    pub cover_image: Option<String>,
    pub has_physical_copy: bool,
    /// Is the book still being written?
    pub is_beta: bool,
    /// Did you finish reading this book?
    pub is_read: bool,
    pub i_wish_it: bool,
    pub read_it_again: bool,
    pub notes: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Model {
    pub fn display_name(&self) -> String {
        display_name(&self.title, &self.subtitle, &self.edition, &self.volume)
    }
}

/// Human-readable book name: `title [- subtitle] [(edition ed)] [Vol. volume]`
pub fn display_name(title: &str, subtitle: &str, edition: &str, volume: &str) -> String {
    let mut parts = vec![title.to_string()];
    if !subtitle.is_empty() {
        parts.push(format!("- {}", subtitle));
    }
    if !edition.is_empty() {
        parts.push(format!("({} ed)", edition));
    }
    if !volume.is_empty() {
        parts.push(format!("Vol. {}", volume));
    }
    parts.join(" ")
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::publisher::Entity",
        from = "Column::PublisherId",
        to = "super::publisher::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Publisher,
    #[sea_orm(has_many = "super::asset::Entity")]
    Assets,
    #[sea_orm(has_many = "super::reading_list_books::Entity")]
    ReadingListBooks,
}

impl Related<super::publisher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Publisher.def()
    }
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assets.def()
    }
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_authors::Relation::Author.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_authors::Relation::Book.def().rev())
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_tags::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_tags::Relation::Book.def().rev())
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_categories::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_categories::Relation::Book.def().rev())
    }
}

impl Related<super::recommender::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_recommenders::Relation::Recommender.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_recommenders::Relation::Book.def().rev())
    }
}

impl Related<super::reading_list::Entity> for Entity {
    fn to() -> RelationDef {
        super::reading_list_books::Relation::ReadingList.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::reading_list_books::Relation::Book.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_with_every_part() {
        assert_eq!(display_name("Foo", "Bar", "2nd", "1"), "Foo - Bar (2nd ed) Vol. 1");
    }

    #[test]
    fn display_name_skips_blank_parts() {
        assert_eq!(display_name("Dune", "", "", ""), "Dune");
        assert_eq!(display_name("Dune", "", "", "3"), "Dune Vol. 3");
        assert_eq!(display_name("Dune", "", "40th Anniversary", ""), "Dune (40th Anniversary ed)");
    }
}
