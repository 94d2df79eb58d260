/// REST API handlers for HTTP endpoints.
/// User registration, login, profiles, the friend-request state machine,
/// and the list/search views with per-user stats.
use crate::auth::{AuthKeys, AuthUser};
use crate::db::{models::*, Database, DbPool, FriendOpError, UserStoreError};
use crate::friends::{RelationshipError, ToggleOutcome};
use actix_web::{web, HttpResponse, Result as ActixResult};
use serde::Deserialize;
use serde_json::json;

/// Map a relationship-operation failure to the contract's 400 body.
/// Each route has its own wording for self-targeting and storage errors.
fn friend_error(err: FriendOpError, self_msg: &str, storage_msg: &str) -> HttpResponse {
    match err {
        FriendOpError::Rule(RelationshipError::SelfTarget) => {
            HttpResponse::BadRequest().json(json!({ "error": self_msg }))
        }
        FriendOpError::Rule(rule) => {
            HttpResponse::BadRequest().json(json!({ "error": rule.to_string() }))
        }
        FriendOpError::Storage(e) => {
            log::error!("{}: {}", storage_msg, e);
            HttpResponse::BadRequest().json(json!({ "error": storage_msg }))
        }
    }
}

/// Register a new user
/// POST /user
pub async fn register_user(
    pool: web::Data<DbPool>,
    req: web::Json<RegisterUserRequest>,
) -> ActixResult<HttpResponse> {
    let (login_name, password, first_name, last_name) = match (
        &req.login_name,
        &req.password,
        &req.first_name,
        &req.last_name,
    ) {
        (Some(l), Some(p), Some(f), Some(la)) => (l, p, f, la),
        _ => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "login_name, password, first_name, and last_name are required"
            })));
        }
    };

    if login_name.trim().is_empty()
        || password.trim().is_empty()
        || first_name.trim().is_empty()
        || last_name.trim().is_empty()
    {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "login_name, password, first_name, and last_name must be non-empty"
        })));
    }

    match Database::register_user(
        &pool,
        login_name,
        password,
        first_name,
        last_name,
        req.location.as_deref().unwrap_or(""),
        req.description.as_deref().unwrap_or(""),
        req.occupation.as_deref().unwrap_or(""),
    )
    .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(RegisterUserResponse {
            login_name: user.login_name,
        })),
        Err(UserStoreError::DuplicateLogin) => Ok(HttpResponse::BadRequest().json(json!({
            "error": "login_name already exists"
        }))),
        Err(e) => {
            log::error!("Error creating user: {}", e);
            Ok(HttpResponse::BadRequest().json(json!({
                "error": "Error creating user"
            })))
        }
    }
}

/// Verify credentials and issue a bearer token
/// POST /admin/login
pub async fn login(
    pool: web::Data<DbPool>,
    keys: web::Data<AuthKeys>,
    req: web::Json<LoginRequest>,
) -> ActixResult<HttpResponse> {
    let (login_name, password) = match (&req.login_name, &req.password) {
        (Some(l), Some(p)) => (l, p),
        _ => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "login_name and password are required"
            })));
        }
    };

    let user = match Database::verify_login(&pool, login_name, password).await {
        Ok(user) => user,
        Err(UserStoreError::InvalidCredentials) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "Invalid login_name or password"
            })));
        }
        Err(e) => {
            log::error!("Error during login: {}", e);
            return Ok(HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            })));
        }
    };

    match keys.issue(&user.id, &user.login_name) {
        Ok(token) => Ok(HttpResponse::Ok().json(LoginResponse {
            token,
            user_id: user.id,
            login_name: user.login_name,
            first_name: user.first_name,
            last_name: user.last_name,
        })),
        Err(e) => {
            log::error!("Error issuing token: {}", e);
            Ok(HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            })))
        }
    }
}

/// List all users with stats relative to the caller
/// GET /user/list
pub async fn list_users(pool: web::Data<DbPool>, caller: AuthUser) -> ActixResult<HttpResponse> {
    match Database::list_users_with_stats(&pool, &caller.user_id).await {
        Ok(users) => Ok(HttpResponse::Ok().json(users)),
        Err(e) => {
            log::error!("Error fetching user list: {}", e);
            Ok(HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            })))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Search users by name or login
/// GET /user/search?q=...
pub async fn search_users(
    pool: web::Data<DbPool>,
    caller: AuthUser,
    query: web::Query<SearchQuery>,
) -> ActixResult<HttpResponse> {
    let needle = query.q.trim();
    if needle.is_empty() {
        return Ok(HttpResponse::Ok().json(Vec::<UserListEntry>::new()));
    }

    match Database::search_users_with_stats(&pool, &caller.user_id, needle).await {
        Ok(users) => Ok(HttpResponse::Ok().json(users)),
        Err(e) => {
            log::error!("Error searching users: {}", e);
            Ok(HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error"
            })))
        }
    }
}

/// Detailed profile with stats and relationship flags
/// GET /user/:id
pub async fn get_user_detail(
    pool: web::Data<DbPool>,
    caller: AuthUser,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let user = match Database::get_user(&pool, &id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::BadRequest().json(json!({ "error": "User not found" })));
        }
        Err(e) => {
            log::error!("Error fetching user: {}", e);
            return Ok(HttpResponse::BadRequest().json(json!({ "error": "Invalid user ID" })));
        }
    };

    let detail = async {
        let (photo_count, comment_count) = Database::user_stats(&pool, &user.id).await?;
        let friend_count = Database::friend_count(&pool, &user.id).await?;
        // Pair ordered as (caller, viewed user): actor_requested is the
        // caller's outgoing request, target_requested the viewed user's.
        let pair = Database::pair_view(&pool, &caller.user_id, &user.id).await?;
        Ok::<_, rusqlite::Error>(UserDetailResponse {
            id: user.id,
            login_name: user.login_name,
            first_name: user.first_name,
            last_name: user.last_name,
            location: user.location,
            description: user.description,
            occupation: user.occupation,
            created_at: user.created_at,
            photo_count,
            comment_count,
            friend_count,
            is_friend: pair.friends,
            has_incoming_request: pair.target_requested,
            has_pending_request: pair.actor_requested,
        })
    }
    .await;

    match detail {
        Ok(detail) => Ok(HttpResponse::Ok().json(detail)),
        Err(e) => {
            log::error!("Error fetching user: {}", e);
            Ok(HttpResponse::BadRequest().json(json!({ "error": "Invalid user ID" })))
        }
    }
}

/// Update the caller's own profile
/// PUT /user/:id
pub async fn update_user(
    pool: web::Data<DbPool>,
    caller: AuthUser,
    id: web::Path<String>,
    req: web::Json<UpdateProfileRequest>,
) -> ActixResult<HttpResponse> {
    if *id != caller.user_id {
        return Ok(HttpResponse::Forbidden().json(json!({ "error": "Forbidden" })));
    }

    let (first_name, last_name) = match (&req.first_name, &req.last_name) {
        (Some(f), Some(l)) => (f.trim(), l.trim()),
        _ => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "first_name and last_name are required"
            })));
        }
    };
    if first_name.is_empty() || last_name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "first_name and last_name must be non-empty"
        })));
    }

    match Database::update_profile(
        &pool,
        &id,
        first_name,
        last_name,
        req.location.as_deref().unwrap_or(""),
        req.description.as_deref().unwrap_or(""),
        req.occupation.as_deref().unwrap_or(""),
    )
    .await
    {
        Ok(true) => Ok(HttpResponse::Ok().json(json!({ "message": "User updated successfully" }))),
        Ok(false) => Ok(HttpResponse::BadRequest().json(json!({ "error": "User not found" }))),
        Err(e) => {
            log::error!("Error updating user: {}", e);
            Ok(HttpResponse::BadRequest().json(json!({ "error": "Error updating user" })))
        }
    }
}

/// Send or cancel a friend request
/// POST /user/:id/friend-request
pub async fn toggle_friend_request(
    pool: web::Data<DbPool>,
    caller: AuthUser,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match Database::toggle_request(&pool, &caller.user_id, &id).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(ToggleRequestResponse {
            requested: outcome == ToggleOutcome::Sent,
        })),
        Err(e) => Ok(friend_error(
            e,
            "Cannot friend yourself",
            "Error sending friend request",
        )),
    }
}

/// Accept a friend request
/// POST /user/:id/friend-accept
pub async fn accept_friend_request(
    pool: web::Data<DbPool>,
    caller: AuthUser,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match Database::accept_request(&pool, &caller.user_id, &id).await {
        Ok(friend_count) => Ok(HttpResponse::Ok().json(FriendshipResponse {
            is_friend: true,
            friend_count,
        })),
        Err(e) => Ok(friend_error(e, "Invalid user", "Error accepting request")),
    }
}

/// Reject a friend request
/// POST /user/:id/friend-reject
pub async fn reject_friend_request(
    pool: web::Data<DbPool>,
    caller: AuthUser,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match Database::reject_request(&pool, &caller.user_id, &id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(RejectResponse { rejected: true })),
        Err(e) => Ok(friend_error(e, "Invalid user", "Error rejecting request")),
    }
}

/// Remove a friend
/// POST /user/:id/unfriend
pub async fn unfriend_user(
    pool: web::Data<DbPool>,
    caller: AuthUser,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    match Database::unfriend(&pool, &caller.user_id, &id).await {
        Ok(friend_count) => Ok(HttpResponse::Ok().json(FriendshipResponse {
            is_friend: false,
            friend_count,
        })),
        Err(e) => Ok(friend_error(e, "Invalid user", "Error removing friend")),
    }
}

/// List incoming friend requests (self only)
/// GET /user/:id/requests
pub async fn list_friend_requests(
    pool: web::Data<DbPool>,
    caller: AuthUser,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    if *id != caller.user_id {
        return Ok(HttpResponse::Forbidden().json(json!({ "error": "Forbidden" })));
    }

    match Database::get_user(&pool, &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::BadRequest().json(json!({ "error": "User not found" })));
        }
        Err(e) => {
            log::error!("Error fetching friend requests: {}", e);
            return Ok(
                HttpResponse::BadRequest().json(json!({ "error": "Error fetching requests" }))
            );
        }
    }

    match Database::list_incoming_requests(&pool, &id).await {
        Ok(users) => Ok(HttpResponse::Ok().json(users)),
        Err(e) => {
            log::error!("Error fetching friend requests: {}", e);
            Ok(HttpResponse::BadRequest().json(json!({ "error": "Error fetching requests" })))
        }
    }
}

/// List friends (self only)
/// GET /user/:id/friends
pub async fn list_friends(
    pool: web::Data<DbPool>,
    caller: AuthUser,
    id: web::Path<String>,
) -> ActixResult<HttpResponse> {
    if *id != caller.user_id {
        return Ok(HttpResponse::Forbidden().json(json!({ "error": "Forbidden" })));
    }

    match Database::get_user(&pool, &id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::BadRequest().json(json!({ "error": "User not found" })));
        }
        Err(e) => {
            log::error!("Error fetching friends: {}", e);
            return Ok(HttpResponse::BadRequest().json(json!({ "error": "Error fetching friends" })));
        }
    }

    match Database::list_friends(&pool, &id).await {
        Ok(users) => Ok(HttpResponse::Ok().json(users)),
        Err(e) => {
            log::error!("Error fetching friends: {}", e);
            Ok(HttpResponse::BadRequest().json(json!({ "error": "Error fetching friends" })))
        }
    }
}

/// Health check endpoint
/// GET /health
pub async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok"
    })))
}
