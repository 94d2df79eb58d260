/// HTTP handlers module
/// Provides the REST endpoints

pub mod rest;

pub use rest::{
    accept_friend_request, get_user_detail, health, list_friend_requests, list_friends,
    list_users, login, register_user, reject_friend_request, search_users,
    toggle_friend_request, unfriend_user, update_user,
};
