use sea_orm::entity::prelude::*;

/// Explicit membership row between a reading list and a book.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "reading_list_books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub book_id: i32,
    pub reading_list_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Book,
    #[sea_orm(
        belongs_to = "super::reading_list::Entity",
        from = "Column::ReadingListId",
        to = "super::reading_list::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ReadingList,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::reading_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReadingList.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
