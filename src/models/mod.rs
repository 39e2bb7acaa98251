pub mod asset;
pub mod author;
pub mod book;
pub mod book_authors;
pub mod book_categories;
pub mod book_recommenders;
pub mod book_tags;
pub mod category;
pub mod publisher;
pub mod reading_list;
pub mod reading_list_books;
pub mod recommender;
pub mod tag;
