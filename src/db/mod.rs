/// Database layer for persistent storage.
/// Handles all database operations for users, the friend graph, and the
/// photo/comment stats the list views join against.
pub mod init;
pub mod models;

use crate::friends::{self, PairView, RelationshipError, ToggleOutcome};
use chrono::Utc;
use models::{Comment, Photo, User, UserListEntry, UserSummary, UserWithPassword};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

pub type DbPool = Arc<Mutex<Connection>>;

/// Create a connection pool (simplified for single-threaded SQLite)
pub fn create_pool(db_path: &str) -> SqliteResult<DbPool> {
    let conn = Connection::open(db_path)?;
    init::initialize_database(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Create an in-memory database for testing
pub fn create_test_pool() -> DbPool {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory DB");
    init::initialize_database(&conn).expect("Failed to initialize DB");
    Arc::new(Mutex::new(conn))
}

/// Failures of the user-account operations.
#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("login_name already exists")]
    DuplicateLogin,
    #[error("Invalid login_name or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

/// Failures of the four relationship operations: either a rule violation
/// from the state machine or a storage error.
#[derive(Debug, Error)]
pub enum FriendOpError {
    #[error(transparent)]
    Rule(#[from] RelationshipError),
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

const SELECT_USER: &str = "SELECT id, login_name, password_hash, first_name, last_name, \
     location, description, occupation, created_at FROM users";

fn row_to_user(row: &rusqlite::Row<'_>) -> SqliteResult<UserWithPassword> {
    Ok(UserWithPassword {
        user: User {
            id: row.get(0)?,
            login_name: row.get(1)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            location: row.get(5)?,
            description: row.get(6)?,
            occupation: row.get(7)?,
            created_at: row.get(8)?,
        },
        password_hash: row.get(2)?,
    })
}

fn both_exist(conn: &Connection, a: &str, b: &str) -> SqliteResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE id IN (?1, ?2)",
        params![a, b],
        |row| row.get(0),
    )?;
    Ok(count == 2)
}

fn pair_view_conn(conn: &Connection, actor: &str, target: &str) -> SqliteResult<PairView> {
    let (lo, hi) = friends::canonical_pair(actor, target);
    let is_friend: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM friendships WHERE user_lo = ?1 AND user_hi = ?2)",
        params![lo, hi],
        |row| row.get(0),
    )?;
    let actor_requested: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM friend_requests WHERE sender = ?1 AND recipient = ?2)",
        params![actor, target],
        |row| row.get(0),
    )?;
    let target_requested: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM friend_requests WHERE sender = ?1 AND recipient = ?2)",
        params![target, actor],
        |row| row.get(0),
    )?;
    Ok(PairView {
        friends: is_friend,
        actor_requested,
        target_requested,
    })
}

fn friend_count_conn(conn: &Connection, user_id: &str) -> SqliteResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM friendships WHERE user_lo = ?1 OR user_hi = ?1",
        params![user_id],
        |row| row.get(0),
    )
}

/// Database operations
pub struct Database;

impl Database {
    /// Register a new user. The password is bcrypt-hashed before storage.
    pub async fn register_user(
        pool: &DbPool,
        login_name: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        location: &str,
        description: &str,
        occupation: &str,
    ) -> Result<User, UserStoreError> {
        let conn = pool.lock().await;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE login_name = ?1)",
            params![login_name],
            |row| row.get(0),
        )?;
        if exists {
            return Err(UserStoreError::DuplicateLogin);
        }

        let id = Uuid::new_v4().to_string();
        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let created_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO users (id, login_name, password_hash, first_name, last_name, \
             location, description, occupation, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                login_name,
                password_hash,
                first_name,
                last_name,
                location,
                description,
                occupation,
                created_at
            ],
        )?;

        let user = conn.query_row(
            &format!("{SELECT_USER} WHERE id = ?1"),
            params![id],
            row_to_user,
        )?;
        Ok(user.user)
    }

    /// Check a login_name/password pair. Unknown logins and wrong
    /// passwords are indistinguishable to the caller.
    pub async fn verify_login(
        pool: &DbPool,
        login_name: &str,
        password: &str,
    ) -> Result<User, UserStoreError> {
        let conn = pool.lock().await;

        let record = conn
            .query_row(
                &format!("{SELECT_USER} WHERE login_name = ?1"),
                params![login_name],
                row_to_user,
            )
            .optional()?;

        let record = record.ok_or(UserStoreError::InvalidCredentials)?;
        if !bcrypt::verify(password, &record.password_hash)? {
            return Err(UserStoreError::InvalidCredentials);
        }
        Ok(record.user)
    }

    /// Get user by id
    pub async fn get_user(pool: &DbPool, id: &str) -> SqliteResult<Option<User>> {
        let conn = pool.lock().await;
        let record = conn
            .query_row(&format!("{SELECT_USER} WHERE id = ?1"), params![id], row_to_user)
            .optional()?;
        Ok(record.map(|r| r.user))
    }

    /// Update the free-text profile fields. Returns false when no such
    /// user exists.
    pub async fn update_profile(
        pool: &DbPool,
        id: &str,
        first_name: &str,
        last_name: &str,
        location: &str,
        description: &str,
        occupation: &str,
    ) -> SqliteResult<bool> {
        let conn = pool.lock().await;
        let changed = conn.execute(
            "UPDATE users SET first_name = ?2, last_name = ?3, location = ?4, \
             description = ?5, occupation = ?6 WHERE id = ?1",
            params![id, first_name, last_name, location, description, occupation],
        )?;
        Ok(changed > 0)
    }

    /// All users with photo/comment counts and the is_friend flag
    /// relative to the caller, as one aggregate query.
    pub async fn list_users_with_stats(
        pool: &DbPool,
        caller_id: &str,
    ) -> SqliteResult<Vec<UserListEntry>> {
        let conn = pool.lock().await;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.first_name, u.last_name, \
             (SELECT COUNT(*) FROM photos p WHERE p.owner_id = u.id), \
             (SELECT COUNT(*) FROM comments c WHERE c.author_id = u.id), \
             EXISTS(SELECT 1 FROM friendships f \
                    WHERE f.user_lo = min(u.id, ?1) AND f.user_hi = max(u.id, ?1)) \
             FROM users u ORDER BY u.last_name, u.first_name",
        )?;
        let entries = stmt
            .query_map(params![caller_id], |row| {
                Ok(UserListEntry {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    photo_count: row.get(3)?,
                    comment_count: row.get(4)?,
                    is_friend: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Same as `list_users_with_stats`, filtered by a case-insensitive
    /// substring match on first/last/login name. `instr` sidesteps LIKE
    /// wildcard escaping.
    pub async fn search_users_with_stats(
        pool: &DbPool,
        caller_id: &str,
        query: &str,
    ) -> SqliteResult<Vec<UserListEntry>> {
        let needle = query.to_lowercase();
        let conn = pool.lock().await;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.first_name, u.last_name, \
             (SELECT COUNT(*) FROM photos p WHERE p.owner_id = u.id), \
             (SELECT COUNT(*) FROM comments c WHERE c.author_id = u.id), \
             EXISTS(SELECT 1 FROM friendships f \
                    WHERE f.user_lo = min(u.id, ?1) AND f.user_hi = max(u.id, ?1)) \
             FROM users u \
             WHERE instr(lower(u.first_name), ?2) > 0 \
                OR instr(lower(u.last_name), ?2) > 0 \
                OR instr(lower(u.login_name), ?2) > 0 \
             ORDER BY u.last_name, u.first_name",
        )?;
        let entries = stmt
            .query_map(params![caller_id, needle], |row| {
                Ok(UserListEntry {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    photo_count: row.get(3)?,
                    comment_count: row.get(4)?,
                    is_friend: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Photo and comment counts for a single user.
    pub async fn user_stats(pool: &DbPool, user_id: &str) -> SqliteResult<(i64, i64)> {
        let conn = pool.lock().await;
        conn.query_row(
            "SELECT (SELECT COUNT(*) FROM photos WHERE owner_id = ?1), \
                    (SELECT COUNT(*) FROM comments WHERE author_id = ?1)",
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
    }

    pub async fn friend_count(pool: &DbPool, user_id: &str) -> SqliteResult<i64> {
        let conn = pool.lock().await;
        friend_count_conn(&conn, user_id)
    }

    /// Edge membership for an ordered (actor, target) pair.
    pub async fn pair_view(pool: &DbPool, actor: &str, target: &str) -> SqliteResult<PairView> {
        let conn = pool.lock().await;
        pair_view_conn(&conn, actor, target)
    }

    /// Send or cancel a friend request, per the state machine.
    pub async fn toggle_request(
        pool: &DbPool,
        actor: &str,
        target: &str,
    ) -> Result<ToggleOutcome, FriendOpError> {
        if actor == target {
            return Err(RelationshipError::SelfTarget.into());
        }
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        if !both_exist(&tx, actor, target)? {
            return Err(RelationshipError::UserNotFound.into());
        }
        let pair = pair_view_conn(&tx, actor, target)?;
        let outcome = friends::plan_toggle(&pair).map_err(FriendOpError::Rule)?;
        match outcome {
            ToggleOutcome::Sent => {
                tx.execute(
                    "INSERT INTO friend_requests (sender, recipient, created_at) \
                     VALUES (?1, ?2, ?3)",
                    params![actor, target, Utc::now().to_rfc3339()],
                )?;
            }
            ToggleOutcome::Cancelled => {
                tx.execute(
                    "DELETE FROM friend_requests WHERE sender = ?1 AND recipient = ?2",
                    params![actor, target],
                )?;
            }
        }
        tx.commit()?;

        log::debug!(
            "friend-request toggle {} -> {}: {:?} (was {:?})",
            actor,
            target,
            outcome,
            pair.state()
        );
        Ok(outcome)
    }

    /// Accept a pending request from `requester`. Returns the
    /// requester's updated friend count.
    pub async fn accept_request(
        pool: &DbPool,
        actor: &str,
        requester: &str,
    ) -> Result<i64, FriendOpError> {
        if actor == requester {
            return Err(RelationshipError::SelfTarget.into());
        }
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        if !both_exist(&tx, actor, requester)? {
            return Err(RelationshipError::UserNotFound.into());
        }
        let pair = pair_view_conn(&tx, actor, requester)?;
        friends::plan_accept(&pair).map_err(FriendOpError::Rule)?;

        tx.execute(
            "DELETE FROM friend_requests WHERE sender = ?1 AND recipient = ?2",
            params![requester, actor],
        )?;
        let (lo, hi) = friends::canonical_pair(actor, requester);
        // Idempotent: an existing friendship row is left untouched
        tx.execute(
            "INSERT OR IGNORE INTO friendships (user_lo, user_hi, created_at) \
             VALUES (?1, ?2, ?3)",
            params![lo, hi, Utc::now().to_rfc3339()],
        )?;
        let count = friend_count_conn(&tx, requester)?;
        tx.commit()?;
        Ok(count)
    }

    /// Reject a request from `requester`. Rejecting a request that does
    /// not exist is a silent no-op; clients may double-submit.
    pub async fn reject_request(
        pool: &DbPool,
        actor: &str,
        requester: &str,
    ) -> Result<(), FriendOpError> {
        if actor == requester {
            return Err(RelationshipError::SelfTarget.into());
        }
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        if !both_exist(&tx, actor, requester)? {
            return Err(RelationshipError::UserNotFound.into());
        }
        tx.execute(
            "DELETE FROM friend_requests WHERE sender = ?1 AND recipient = ?2",
            params![requester, actor],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Remove a friendship (idempotent). Returns the other user's
    /// updated friend count.
    pub async fn unfriend(pool: &DbPool, actor: &str, other: &str) -> Result<i64, FriendOpError> {
        if actor == other {
            return Err(RelationshipError::SelfTarget.into());
        }
        let mut conn = pool.lock().await;
        let tx = conn.transaction()?;

        if !both_exist(&tx, actor, other)? {
            return Err(RelationshipError::UserNotFound.into());
        }
        let (lo, hi) = friends::canonical_pair(actor, other);
        tx.execute(
            "DELETE FROM friendships WHERE user_lo = ?1 AND user_hi = ?2",
            params![lo, hi],
        )?;
        let count = friend_count_conn(&tx, other)?;
        tx.commit()?;
        Ok(count)
    }

    /// The user's friends as summaries, sorted by name.
    pub async fn list_friends(pool: &DbPool, user_id: &str) -> SqliteResult<Vec<UserSummary>> {
        let conn = pool.lock().await;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.first_name, u.last_name FROM users u \
             JOIN friendships f \
               ON (f.user_lo = ?1 AND f.user_hi = u.id) \
               OR (f.user_hi = ?1 AND f.user_lo = u.id) \
             ORDER BY u.first_name, u.last_name",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(UserSummary {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Users with a pending request to `user_id`, sorted by name.
    pub async fn list_incoming_requests(
        pool: &DbPool,
        user_id: &str,
    ) -> SqliteResult<Vec<UserSummary>> {
        let conn = pool.lock().await;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.first_name, u.last_name FROM users u \
             JOIN friend_requests r ON r.sender = u.id \
             WHERE r.recipient = ?1 \
             ORDER BY u.first_name, u.last_name",
        )?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(UserSummary {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Store a photo record. Photo uploads are owned elsewhere in the
    /// app; this exists so the stats aggregator has data to join.
    pub async fn add_photo(pool: &DbPool, owner_id: &str, file_name: &str) -> SqliteResult<Photo> {
        let conn = pool.lock().await;
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO photos (id, owner_id, file_name, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, owner_id, file_name, created_at],
        )?;
        Ok(Photo {
            id,
            owner_id: owner_id.to_string(),
            file_name: file_name.to_string(),
            created_at,
        })
    }

    /// Store a comment on a photo.
    pub async fn add_comment(
        pool: &DbPool,
        photo_id: &str,
        author_id: &str,
        body: &str,
    ) -> SqliteResult<Comment> {
        let conn = pool.lock().await;
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO comments (id, photo_id, author_id, body, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, photo_id, author_id, body, created_at],
        )?;
        Ok(Comment {
            id,
            photo_id: photo_id.to_string(),
            author_id: author_id.to_string(),
            body: body.to_string(),
            created_at,
        })
    }
}
