/// HTTP server factory and configuration.
/// Provides a reusable function to create and configure the HTTP server
/// for use in both the main binary and tests.
use crate::auth::AuthKeys;
use crate::db::DbPool;
use crate::handlers::{
    accept_friend_request, get_user_detail, health, list_friend_requests, list_friends,
    list_users, login, register_user, reject_friend_request, search_users,
    toggle_friend_request, unfriend_user, update_user,
};
use actix_web::{middleware, web, App, HttpServer};

/// Register all routes. Shared by the binary and the test apps so the
/// two can never drift apart.
///
/// `/user/list` and `/user/search` must be registered before
/// `/user/{id}` so the literal segments win.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/admin/login", web::post().to(login))
        .route("/user", web::post().to(register_user))
        .route("/user/list", web::get().to(list_users))
        .route("/user/search", web::get().to(search_users))
        .route("/user/{id}", web::get().to(get_user_detail))
        .route("/user/{id}", web::put().to(update_user))
        .route(
            "/user/{id}/friend-request",
            web::post().to(toggle_friend_request),
        )
        .route(
            "/user/{id}/friend-accept",
            web::post().to(accept_friend_request),
        )
        .route(
            "/user/{id}/friend-reject",
            web::post().to(reject_friend_request),
        )
        .route("/user/{id}/unfriend", web::post().to(unfriend_user))
        .route("/user/{id}/requests", web::get().to(list_friend_requests))
        .route("/user/{id}/friends", web::get().to(list_friends));
}

/// Create a configured HTTP server
///
/// Takes a database pool, the auth keys, and a bind address, then
/// returns a fully configured `HttpServer` ready to be run.
pub fn create_http_server(
    pool: web::Data<DbPool>,
    auth_keys: web::Data<AuthKeys>,
    bind_addr: &str,
) -> std::io::Result<actix_web::dev::Server> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(auth_keys.clone())
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
