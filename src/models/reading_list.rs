use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reading_lists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reading_list_books::Entity")]
    ReadingListBooks,
}

impl Related<super::reading_list_books::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReadingListBooks.def()
    }
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        super::reading_list_books::Relation::Book.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::reading_list_books::Relation::ReadingList.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
