use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

use crate::domain::TaxonomyKind;

const KEEP_ALIVE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    init_db_with_pool(database_url, 5).await
}

pub async fn init_db_with_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());

    // Every connection to an in-memory SQLite database gets its own empty
    // database, so the pool must hold exactly one long-lived connection.
    if database_url.contains(":memory:") {
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(KEEP_ALIVE)
            .max_lifetime(KEEP_ALIVE);
    } else {
        options.max_connections(max_connections.max(1));
    }
    options.sqlx_logging(false);

    let db = Database::connect(options).await?;

    run_migrations(&db).await?;

    Ok(db)
}

async fn execute(db: &DatabaseConnection, sql: &str) -> Result<(), DbErr> {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_owned()))
        .await?;
    Ok(())
}

const BOOK_JOIN_TABLES: [(&str, &str, &str); 4] = [
    ("book_authors", "author_id", "authors"),
    ("book_categories", "category_id", "categories"),
    ("book_recommenders", "recommender_id", "recommenders"),
    ("book_tags", "tag_id", "tags"),
];

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    // sqlx already enables this per connection; keep it explicit
    execute(db, "PRAGMA foreign_keys = ON").await?;

    for kind in TaxonomyKind::ALL {
        let table = kind.table_name();
        let max_name = kind.max_name_len();
        execute(
            db,
            &format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE CHECK (length(name) BETWEEN 1 AND {max_name}),
                    slug TEXT NOT NULL UNIQUE CHECK (slug <> ''),
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
                "#
            ),
        )
        .await?;
    }

    // Books. Optional text columns default to '' so the identity tuple is
    // comparable; the publisher reference is protected.
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 255),
            subtitle TEXT NOT NULL DEFAULT '' CHECK (length(subtitle) <= 255),
            edition TEXT NOT NULL DEFAULT '' CHECK (length(edition) <= 20),
            volume TEXT NOT NULL DEFAULT '' CHECK (length(volume) <= 20),
            publisher_id INTEGER,
            publication_year INTEGER CHECK (publication_year BETWEEN 1000 AND 3000),
            cover_image TEXT,
            has_physical_copy INTEGER NOT NULL DEFAULT 0,
            is_beta INTEGER NOT NULL DEFAULT 0,
            is_read INTEGER NOT NULL DEFAULT 0,
            i_wish_it INTEGER NOT NULL DEFAULT 0,
            read_it_again INTEGER NOT NULL DEFAULT 0,
            notes TEXT NOT NULL DEFAULT '',
            slug TEXT NOT NULL UNIQUE CHECK (slug <> ''),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CONSTRAINT unique_book_name UNIQUE (title, subtitle, edition, volume),
            FOREIGN KEY (publisher_id) REFERENCES publishers(id) ON DELETE RESTRICT
        );
        CREATE INDEX IF NOT EXISTS idx_books_created_at ON books(created_at DESC);
        CREATE INDEX IF NOT EXISTS idx_books_title ON books(title);
        CREATE INDEX IF NOT EXISTS idx_books_subtitle ON books(subtitle);
        CREATE INDEX IF NOT EXISTS idx_books_publication_year ON books(publication_year);
        CREATE INDEX IF NOT EXISTS idx_books_is_read ON books(is_read);
        CREATE INDEX IF NOT EXISTS idx_books_is_beta ON books(is_beta);
        CREATE INDEX IF NOT EXISTS idx_books_i_wish_it ON books(i_wish_it);
        CREATE INDEX IF NOT EXISTS idx_books_slug ON books(slug);
        CREATE INDEX IF NOT EXISTS idx_books_publisher_id ON books(publisher_id);
        "#,
    )
    .await?;

    // Junction tables detach on either side's deletion
    for (table, column, target) in BOOK_JOIN_TABLES {
        execute(
            db,
            &format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    book_id INTEGER NOT NULL,
                    {column} INTEGER NOT NULL,
                    PRIMARY KEY (book_id, {column}),
                    FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE ON UPDATE CASCADE,
                    FOREIGN KEY ({column}) REFERENCES {target}(id) ON DELETE CASCADE ON UPDATE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_{table}_{column} ON {table}({column});
                "#
            ),
        )
        .await?;
    }

    // Assets: owned by their book, globally unique by content hash
    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS assets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            book_id INTEGER NOT NULL,
            file TEXT NOT NULL,
            file_name TEXT NOT NULL CHECK (length(file_name) BETWEEN 1 AND 255),
            file_extension TEXT NOT NULL CHECK (length(file_extension) BETWEEN 1 AND 10),
            file_size INTEGER NOT NULL CHECK (file_size >= 0),
            file_hash TEXT NOT NULL UNIQUE CHECK (length(file_hash) BETWEEN 1 AND 128),
            created_at TEXT NOT NULL,
            FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_assets_book_id ON assets(book_id);
        CREATE INDEX IF NOT EXISTS idx_assets_file_extension ON assets(file_extension);
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS reading_lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE CHECK (length(name) BETWEEN 1 AND 255),
            slug TEXT NOT NULL UNIQUE CHECK (slug <> ''),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .await?;

    execute(
        db,
        r#"
        CREATE TABLE IF NOT EXISTS reading_list_books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            book_id INTEGER NOT NULL,
            reading_list_id INTEGER NOT NULL,
            FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE CASCADE,
            FOREIGN KEY (reading_list_id) REFERENCES reading_lists(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_reading_list_books_book_id ON reading_list_books(book_id);
        CREATE INDEX IF NOT EXISTS idx_reading_list_books_list_id ON reading_list_books(reading_list_id);
        "#,
    )
    .await?;

    tracing::debug!("Schema is up to date");
    Ok(())
}
