/// HTTP-level tests for the REST surface
/// Exercises routing, auth, status codes, and response shapes
use actix_web::{test, web, App};
use photoshare_server::auth::AuthKeys;
use photoshare_server::db::{create_test_pool, Database, DbPool};
use photoshare_server::server::configure_routes;
use serde_json::{json, Value};

fn test_state() -> (web::Data<DbPool>, web::Data<AuthKeys>) {
    (
        web::Data::new(create_test_pool()),
        web::Data::new(AuthKeys::new("test-secret", 3600)),
    )
}

async fn register(pool: &web::Data<DbPool>, login: &str, password: &str, first: &str, last: &str) -> String {
    Database::register_user(pool, login, password, first, last, "", "", "")
        .await
        .expect("Failed to register user")
        .id
}

fn bearer(keys: &AuthKeys, user_id: &str, login: &str) -> (&'static str, String) {
    let token = keys.issue(user_id, login).expect("Failed to issue token");
    ("Authorization", format!("Bearer {}", token))
}

#[actix_web::test]
async fn test_auth_is_uniformly_rejected() {
    let (pool, keys) = test_state();
    let app = test::init_service(
        App::new()
            .app_data(pool)
            .app_data(keys)
            .configure(configure_routes),
    )
    .await;

    // Missing header, non-bearer header, and garbage token all get the
    // same 401 body
    for req in [
        test::TestRequest::get().uri("/user/list").to_request(),
        test::TestRequest::get()
            .uri("/user/list")
            .insert_header(("Authorization", "Basic abc"))
            .to_request(),
        test::TestRequest::get()
            .uri("/user/list")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request(),
    ] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Unauthorized" }));
    }
}

#[actix_web::test]
async fn test_registration_validation_and_duplicates() {
    let (pool, keys) = test_state();
    let app = test::init_service(
        App::new()
            .app_data(pool)
            .app_data(keys)
            .configure(configure_routes),
    )
    .await;

    // Missing fields
    let req = test::TestRequest::post()
        .uri("/user")
        .set_json(json!({ "login_name": "alice1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // Empty fields
    let req = test::TestRequest::post()
        .uri("/user")
        .set_json(json!({
            "login_name": "alice1", "password": "pw",
            "first_name": "   ", "last_name": "Arnold"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // Valid registration returns the login_name
    let req = test::TestRequest::post()
        .uri("/user")
        .set_json(json!({
            "login_name": "alice1", "password": "alice-pass",
            "first_name": "Alice", "last_name": "Arnold"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "login_name": "alice1" }));

    // Duplicate login_name
    let req = test::TestRequest::post()
        .uri("/user")
        .set_json(json!({
            "login_name": "alice1", "password": "other",
            "first_name": "Another", "last_name": "Alice"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "login_name already exists");
}

#[actix_web::test]
async fn test_login_round_trip() {
    let (pool, keys) = test_state();
    register(&pool, "alice1", "alice-pass", "Alice", "Arnold").await;
    let app = test::init_service(
        App::new()
            .app_data(pool)
            .app_data(keys)
            .configure(configure_routes),
    )
    .await;

    // Wrong password
    let req = test::TestRequest::post()
        .uri("/admin/login")
        .set_json(json!({ "login_name": "alice1", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // Correct password issues a token
    let req = test::TestRequest::post()
        .uri("/admin/login")
        .set_json(json!({ "login_name": "alice1", "password": "alice-pass" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["login_name"], "alice1");
    assert_eq!(body["first_name"], "Alice");
    let token = body["token"].as_str().expect("Token missing").to_string();

    // The issued token authenticates protected routes
    let req = test::TestRequest::get()
        .uri("/user/list")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_friend_request_accept_unfriend_scenario() {
    let (pool, keys) = test_state();
    let alice = register(&pool, "alice1", "alice-pass", "Alice", "Arnold").await;
    let bob = register(&pool, "bob1", "bob-pass", "Bob", "Baker").await;
    let app = test::init_service(
        App::new()
            .app_data(pool)
            .app_data(keys.clone())
            .configure(configure_routes),
    )
    .await;
    let as_alice = bearer(&keys, &alice, "alice1");
    let as_bob = bearer(&keys, &bob, "bob1");

    // Alice requests bob
    let req = test::TestRequest::post()
        .uri(&format!("/user/{}/friend-request", bob))
        .insert_header(as_alice.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "requested": true }));

    // Bob sees the incoming request on alice's detail page
    let req = test::TestRequest::get()
        .uri(&format!("/user/{}", alice))
        .insert_header(as_bob.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["has_incoming_request"], true);
    assert_eq!(body["is_friend"], false);

    // And in his own requests listing
    let req = test::TestRequest::get()
        .uri(&format!("/user/{}/requests", bob))
        .insert_header(as_bob.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body[0]["first_name"], "Alice");

    // Bob accepts
    let req = test::TestRequest::post()
        .uri(&format!("/user/{}/friend-accept", alice))
        .insert_header(as_bob.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "is_friend": true, "friend_count": 1 }));

    // Friendship is visible from alice's side too
    let req = test::TestRequest::get()
        .uri(&format!("/user/{}", bob))
        .insert_header(as_alice.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["is_friend"], true);
    assert_eq!(body["friend_count"], 1);

    // Bob unfriends alice
    let req = test::TestRequest::post()
        .uri(&format!("/user/{}/unfriend", alice))
        .insert_header(as_bob.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "is_friend": false, "friend_count": 0 }));

    let req = test::TestRequest::get()
        .uri(&format!("/user/{}/friends", bob))
        .insert_header(as_bob)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));
}

#[actix_web::test]
async fn test_toggle_cancels_and_reject_is_noop() {
    let (pool, keys) = test_state();
    let alice = register(&pool, "alice1", "pw", "Alice", "Arnold").await;
    let bob = register(&pool, "bob1", "pw", "Bob", "Baker").await;
    let app = test::init_service(
        App::new()
            .app_data(pool)
            .app_data(keys.clone())
            .configure(configure_routes),
    )
    .await;
    let as_alice = bearer(&keys, &alice, "alice1");
    let as_bob = bearer(&keys, &bob, "bob1");

    // Send then cancel
    let req = test::TestRequest::post()
        .uri(&format!("/user/{}/friend-request", bob))
        .insert_header(as_alice.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["requested"], true);

    let req = test::TestRequest::post()
        .uri(&format!("/user/{}/friend-request", bob))
        .insert_header(as_alice.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["requested"], false);

    // Rejecting the now-absent request still succeeds
    let req = test::TestRequest::post()
        .uri(&format!("/user/{}/friend-reject", alice))
        .insert_header(as_bob)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "rejected": true }));
}

#[actix_web::test]
async fn test_self_target_and_missing_user_are_400() {
    let (pool, keys) = test_state();
    let alice = register(&pool, "alice1", "pw", "Alice", "Arnold").await;
    let app = test::init_service(
        App::new()
            .app_data(pool)
            .app_data(keys.clone())
            .configure(configure_routes),
    )
    .await;
    let as_alice = bearer(&keys, &alice, "alice1");

    let req = test::TestRequest::post()
        .uri(&format!("/user/{}/friend-request", alice))
        .insert_header(as_alice.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Cannot friend yourself");

    let req = test::TestRequest::post()
        .uri(&format!("/user/{}/friend-accept", alice))
        .insert_header(as_alice.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid user");

    // Unknown target id: 400, not 404, which is what clients expect
    let req = test::TestRequest::post()
        .uri("/user/no-such-id/friend-request")
        .insert_header(as_alice.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "User not found");

    let req = test::TestRequest::get()
        .uri("/user/no-such-id")
        .insert_header(as_alice)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_self_only_routes_are_forbidden_for_others() {
    let (pool, keys) = test_state();
    let alice = register(&pool, "alice1", "pw", "Alice", "Arnold").await;
    let bob = register(&pool, "bob1", "pw", "Bob", "Baker").await;
    let app = test::init_service(
        App::new()
            .app_data(pool)
            .app_data(keys.clone())
            .configure(configure_routes),
    )
    .await;
    let as_alice = bearer(&keys, &alice, "alice1");

    for req in [
        test::TestRequest::put()
            .uri(&format!("/user/{}", bob))
            .insert_header(as_alice.clone())
            .set_json(json!({ "first_name": "Bob", "last_name": "Baker" }))
            .to_request(),
        test::TestRequest::get()
            .uri(&format!("/user/{}/requests", bob))
            .insert_header(as_alice.clone())
            .to_request(),
        test::TestRequest::get()
            .uri(&format!("/user/{}/friends", bob))
            .insert_header(as_alice.clone())
            .to_request(),
    ] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Forbidden" }));
    }
}

#[actix_web::test]
async fn test_profile_update() {
    let (pool, keys) = test_state();
    let alice = register(&pool, "alice1", "pw", "Alice", "Arnold").await;
    let app = test::init_service(
        App::new()
            .app_data(pool)
            .app_data(keys.clone())
            .configure(configure_routes),
    )
    .await;
    let as_alice = bearer(&keys, &alice, "alice1");

    // Empty first_name fails validation
    let req = test::TestRequest::put()
        .uri(&format!("/user/{}", alice))
        .insert_header(as_alice.clone())
        .set_json(json!({ "first_name": "", "last_name": "Arnold" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    // Valid update trims names and fills optional fields
    let req = test::TestRequest::put()
        .uri(&format!("/user/{}", alice))
        .insert_header(as_alice.clone())
        .set_json(json!({
            "first_name": "  Alicia ", "last_name": "Arnold",
            "location": "Oslo", "occupation": "chef"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "User updated successfully");

    let req = test::TestRequest::get()
        .uri(&format!("/user/{}", alice))
        .insert_header(as_alice)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["first_name"], "Alicia");
    assert_eq!(body["location"], "Oslo");
    assert_eq!(body["occupation"], "chef");
    assert_eq!(body["description"], "");
}

#[actix_web::test]
async fn test_list_and_search_with_stats() {
    let (pool, keys) = test_state();
    let alice = register(&pool, "alice1", "pw", "Alice", "Arnold").await;
    let bob = register(&pool, "bob1", "pw", "Bob", "Baker").await;
    let photo = Database::add_photo(&pool, &bob, "b1.jpg")
        .await
        .expect("Failed to add photo");
    Database::add_comment(&pool, &photo.id, &alice, "nice")
        .await
        .expect("Failed to add comment");

    let app = test::init_service(
        App::new()
            .app_data(pool)
            .app_data(keys.clone())
            .configure(configure_routes),
    )
    .await;
    let as_alice = bearer(&keys, &alice, "alice1");

    let req = test::TestRequest::get()
        .uri("/user/list")
        .insert_header(as_alice.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let rows = body.as_array().expect("Expected an array");
    assert_eq!(rows.len(), 2);
    let bob_row = rows
        .iter()
        .find(|r| r["id"] == bob.as_str())
        .expect("Bob missing");
    assert_eq!(bob_row["photo_count"], 1);
    assert_eq!(bob_row["comment_count"], 0);
    assert_eq!(bob_row["is_friend"], false);

    // Empty query is an empty result, not an error
    let req = test::TestRequest::get()
        .uri("/user/search?q=")
        .insert_header(as_alice.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));

    // No-match query likewise
    let req = test::TestRequest::get()
        .uri("/user/search?q=zzz")
        .insert_header(as_alice.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));

    let req = test::TestRequest::get()
        .uri("/user/search?q=bak")
        .insert_header(as_alice)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body[0]["first_name"], "Bob");
}
