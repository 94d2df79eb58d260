/// Data models for database operations.
/// Row structs plus the request/response DTOs used by the REST handlers.
use serde::{Deserialize, Serialize};

/// A user profile as exposed by the API. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub login_name: String,
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    pub description: String,
    pub occupation: String,
    pub created_at: String,
}

/// Internal row including the bcrypt hash. Stays inside the db layer so
/// the hash cannot leak into a response by accident.
#[derive(Debug, Clone)]
pub struct UserWithPassword {
    pub user: User,
    pub password_hash: String,
}

/// The short form used by friends/requests listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

/// One row of the list/search views: a summary joined against the
/// photo/comment counts and the caller's friend set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListEntry {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub photo_count: i64,
    pub comment_count: i64,
    pub is_friend: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub owner_id: String,
    pub file_name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub photo_id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: String,
}

// Request/Response DTOs

/// Registration body. Required fields are Options so that a missing
/// field produces the contract's JSON error instead of a deserializer
/// failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub login_name: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub occupation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterUserResponse {
    pub login_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub login_name: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub login_name: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub occupation: Option<String>,
}

/// GET /user/{id}: profile plus stats and the three relationship flags
/// relative to the caller.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserDetailResponse {
    pub id: String,
    pub login_name: String,
    pub first_name: String,
    pub last_name: String,
    pub location: String,
    pub description: String,
    pub occupation: String,
    pub created_at: String,
    pub photo_count: i64,
    pub comment_count: i64,
    pub friend_count: i64,
    pub is_friend: bool,
    /// The viewed user has a pending request to the caller.
    pub has_incoming_request: bool,
    /// The caller has a pending request to the viewed user.
    pub has_pending_request: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleRequestResponse {
    pub requested: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FriendshipResponse {
    pub is_friend: bool,
    pub friend_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RejectResponse {
    pub rejected: bool,
}
