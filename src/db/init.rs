/// Database schema initialization.
/// Sets up SQLite WAL mode and creates tables on startup.
use rusqlite::{Connection, Result as SqliteResult};

/// Initialize database connection with WAL mode and schema
pub fn initialize_database(conn: &Connection) -> SqliteResult<()> {
    // Enable WAL mode (for file-based DB only, ignore error for in-memory)
    let _ = conn.execute("PRAGMA journal_mode = WAL", []);
    let _ = conn.execute("PRAGMA synchronous = NORMAL", []);

    create_schema(conn)?;

    Ok(())
}

/// Create all database tables
///
/// The relationship graph is stored as edge tables instead of per-user
/// arrays: one canonical row per friendship (user_lo < user_hi) and one
/// ordered row per pending request. Symmetry and sent/received
/// complementarity hold structurally, and every relationship operation
/// is a single transaction.
fn create_schema(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            login_name TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            location TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            occupation TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS friendships (
            user_lo TEXT NOT NULL,
            user_hi TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_lo, user_hi),
            CHECK (user_lo < user_hi),
            FOREIGN KEY(user_lo) REFERENCES users(id),
            FOREIGN KEY(user_hi) REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS friend_requests (
            sender TEXT NOT NULL,
            recipient TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (sender, recipient),
            CHECK (sender <> recipient),
            FOREIGN KEY(sender) REFERENCES users(id),
            FOREIGN KEY(recipient) REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS photos (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            file_name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(owner_id) REFERENCES users(id)
        );

        CREATE TABLE IF NOT EXISTS comments (
            id TEXT PRIMARY KEY,
            photo_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            body TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(photo_id) REFERENCES photos(id),
            FOREIGN KEY(author_id) REFERENCES users(id)
        );

        CREATE INDEX IF NOT EXISTS idx_friendships_hi ON friendships(user_hi);
        CREATE INDEX IF NOT EXISTS idx_requests_recipient ON friend_requests(recipient);
        CREATE INDEX IF NOT EXISTS idx_photos_owner ON photos(owner_id);
        CREATE INDEX IF NOT EXISTS idx_comments_author ON comments(author_id);
        CREATE INDEX IF NOT EXISTS idx_comments_photo ON comments(photo_id);
        "#,
    )?;

    Ok(())
}
