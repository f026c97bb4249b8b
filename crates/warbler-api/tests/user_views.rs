mod common;

use axum::http::StatusCode;
use common::{PASSWORD, TestApp, csrf_token};
use warbler_api::ApiConfig;

// -- Signup, login, logout --

#[tokio::test]
async fn signup_logs_the_new_user_in() {
    let mut app = TestApp::new();

    let resp = app
        .post(
            "/signup",
            &[
                ("username", "newbie"),
                ("email", "newbie@test.com"),
                ("password", "hunter22"),
                ("image_url", ""),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/"));

    let home = app.get("/").await;
    assert!(home.body.contains("@newbie"));
    assert!(home.body.contains("/logout"));

    let user = app.state.db.get_user_by_username("newbie").unwrap().unwrap();
    assert_eq!(user.image_url, warbler_types::DEFAULT_IMAGE_URL);
    assert_ne!(user.password, "hunter22");
}

#[tokio::test]
async fn signup_with_taken_username_rerenders_the_form() {
    let mut app = TestApp::new();
    app.signup("taken");

    let resp = app
        .post(
            "/signup",
            &[
                ("username", "taken"),
                ("email", "other@test.com"),
                ("password", "hunter22"),
            ],
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Username or email already taken."));
    assert!(resp.body.contains(r#"<h2 class="join-message">Join Warbler today.</h2>"#));
    assert!(resp.body.contains(r#"value="other@test.com""#));
}

#[tokio::test]
async fn signup_requires_username_email_and_password() {
    let mut app = TestApp::new();

    let resp = app
        .post("/signup", &[("username", "nopass"), ("email", "nopass@test.com")])
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Username, email and password are required."));
    assert!(app.state.db.get_user_by_username("nopass").unwrap().is_none());
}

#[tokio::test]
async fn login_greets_the_user() {
    let mut app = TestApp::new();
    app.signup("testuser");

    let resp = app
        .post("/login", &[("username", "testuser"), ("password", PASSWORD)])
        .await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/"));

    let home = app.follow(resp).await;
    assert!(home.body.contains("Hello, testuser!"));
    assert!(home.body.contains("@testuser"));
}

#[tokio::test]
async fn login_with_bad_password_is_refused() {
    let mut app = TestApp::new();
    app.signup("testuser");

    let resp = app
        .post("/login", &[("username", "testuser"), ("password", "wrong")])
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Invalid credentials."));
    assert!(resp.body.contains(r#"<button class="btn btn-primary btn-block btn-lg">Log in</button>"#));

    let home = app.get("/").await;
    assert!(home.body.contains("<h1>What's Happening?</h1>"));
}

#[tokio::test]
async fn logout_ends_the_session() {
    let mut app = TestApp::new();
    app.signup("testuser");
    app.login("testuser").await;

    let resp = app.get("/logout").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/login"));

    let page = app.follow(resp).await;
    assert!(page.body.contains("You have successfully logged out."));

    let home = app.get("/").await;
    assert!(home.body.contains(r#"<a href="/signup" class="btn btn-primary">Sign up</a>"#));
}

#[tokio::test]
async fn flash_is_shown_exactly_once() {
    let mut app = TestApp::new();
    app.signup("testuser");
    app.login("testuser").await;

    let first = app.get("/").await;
    assert!(first.body.contains("Hello, testuser!"));

    let second = app.get("/").await;
    assert!(!second.body.contains("Hello, testuser!"));
}

#[tokio::test]
async fn visiting_signup_logs_out() {
    let mut app = TestApp::new();
    app.signup("testuser");
    app.login("testuser").await;

    app.get("/signup").await;

    let resp = app.get("/messages/new").await;
    assert_eq!(resp.status, StatusCode::FOUND);
}

// -- Browsing --

#[tokio::test]
async fn users_index_lists_everyone() {
    let mut app = TestApp::new();
    app.signup("testuser");
    app.signup("abc");
    app.signup("efg");
    app.login("testuser").await;

    let resp = app.get("/users").await;
    assert_eq!(resp.status, StatusCode::OK);
    for name in ["@testuser", "@abc", "@efg"] {
        assert!(resp.body.contains(name), "missing {name}");
    }
}

#[tokio::test]
async fn users_search_filters_by_username() {
    let mut app = TestApp::new();
    app.signup("testuser");
    app.signup("abc");
    app.signup("efg");
    app.login("abc").await;

    let resp = app.get("/users?q=TEST").await;
    assert!(resp.body.contains("@testuser"));
    assert!(!resp.body.contains("@abc"));
    assert!(!resp.body.contains("@efg"));

    let none = app.get("/users?q=zzz").await;
    assert!(none.body.contains("Sorry, no users found"));
}

#[tokio::test]
async fn user_show_renders_profile() {
    let mut app = TestApp::new();
    let user = app.signup("testuser");
    app.state.db.create_message(user.id, "first warble").unwrap();
    app.login("testuser").await;

    let resp = app.get(&format!("/users/{}", user.id)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("@testuser"));
    assert!(resp.body.contains("first warble"));
}

#[tokio::test]
async fn unknown_or_malformed_user_ids_are_404() {
    let mut app = TestApp::new();
    app.signup("testuser");
    app.login("testuser").await;

    let resp = app.get(&format!("/users/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app.get("/users/not-a-uuid").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app.get("/no/such/page").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.body.contains("404"));
}

#[tokio::test]
async fn user_pages_require_login() {
    let mut app = TestApp::new();
    let user = app.signup("testuser");

    let paths = [
        "/users".to_string(),
        format!("/users/{}", user.id),
        format!("/users/{}/following", user.id),
        format!("/users/{}/followers", user.id),
    ];

    for path in paths {
        let resp = app.get(&path).await;
        assert_eq!(resp.status, StatusCode::FOUND);
        assert_eq!(resp.location.as_deref(), Some("/"));

        let home = app.follow(resp).await;
        assert!(home.body.contains("Access unauthorized."));
    }
}

// -- Follows --

#[tokio::test]
async fn following_and_followers_pages_list_edges() {
    let mut app = TestApp::new();
    let me = app.signup("testuser");
    let abc = app.signup("abc");
    let efg = app.signup("efg");
    app.state.db.follow(me.id, abc.id).unwrap();
    app.state.db.follow(efg.id, me.id).unwrap();
    app.login("testuser").await;

    let following = app.get(&format!("/users/{}/following", me.id)).await;
    assert_eq!(following.status, StatusCode::OK);
    assert!(following.body.contains("@abc"));
    assert!(!following.body.contains("@efg"));

    let followers = app.get(&format!("/users/{}/followers", me.id)).await;
    assert!(followers.body.contains("@efg"));
    assert!(!followers.body.contains("@abc"));
}

#[tokio::test]
async fn follow_and_stop_following() {
    let mut app = TestApp::new();
    let me = app.signup("testuser");
    let other = app.signup("other");
    app.login("testuser").await;

    let resp = app.post(&format!("/users/follow/{}", other.id), &[]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(
        resp.location.as_deref(),
        Some(format!("/users/{}/following", me.id).as_str())
    );
    assert!(app.state.db.is_following(me.id, other.id).unwrap());

    let resp = app
        .post(&format!("/users/stop-following/{}", other.id), &[])
        .await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert!(!app.state.db.is_following(me.id, other.id).unwrap());
}

#[tokio::test]
async fn following_yourself_is_refused() {
    let mut app = TestApp::new();
    let me = app.signup("testuser");
    app.login("testuser").await;

    let resp = app.post(&format!("/users/follow/{}", me.id), &[]).await;
    assert_eq!(resp.status, StatusCode::FOUND);

    let page = app.follow(resp).await;
    assert!(page.body.contains("You cannot follow yourself."));
    assert!(!app.state.db.is_following(me.id, me.id).unwrap());
}

#[tokio::test]
async fn follow_requires_login() {
    let mut app = TestApp::new();
    let other = app.signup("other");

    let resp = app.post(&format!("/users/follow/{}", other.id), &[]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/"));
    assert!(app.state.db.followers(other.id).unwrap().is_empty());
}

// -- Profile --

#[tokio::test]
async fn profile_edit_with_correct_password() {
    let mut app = TestApp::new();
    let me = app.signup("testuser");
    app.login("testuser").await;

    let resp = app
        .post(
            "/users/profile",
            &[
                ("username", "renamed"),
                ("bio", "Hello there"),
                ("location", "Lisbon"),
                ("password", PASSWORD),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(
        resp.location.as_deref(),
        Some(format!("/users/{}", me.id).as_str())
    );

    let saved = app.state.db.get_user(me.id).unwrap().unwrap();
    assert_eq!(saved.username, "renamed");
    assert_eq!(saved.email, me.email);
    assert_eq!(saved.bio.as_deref(), Some("Hello there"));
    assert_eq!(saved.location.as_deref(), Some("Lisbon"));
}

#[tokio::test]
async fn profile_edit_with_wrong_password_changes_nothing() {
    let mut app = TestApp::new();
    let me = app.signup("testuser");
    app.login("testuser").await;

    let resp = app
        .post("/users/profile", &[("username", "renamed"), ("password", "nope")])
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Wrong password, please try again."));

    let saved = app.state.db.get_user(me.id).unwrap().unwrap();
    assert_eq!(saved.username, "testuser");
}

#[tokio::test]
async fn profile_edit_to_taken_username_is_refused() {
    let mut app = TestApp::new();
    let me = app.signup("testuser");
    app.signup("abc");
    app.login("testuser").await;

    let resp = app
        .post("/users/profile", &[("username", "abc"), ("password", PASSWORD)])
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Username or email already taken."));
    assert_eq!(app.state.db.get_user(me.id).unwrap().unwrap().username, "testuser");
}

#[tokio::test]
async fn profile_edit_requires_login() {
    let mut app = TestApp::new();

    let resp = app.get("/users/profile").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn delete_account_removes_everything() {
    let mut app = TestApp::new();
    let me = app.signup("testuser");
    let other = app.signup("other");
    app.state.db.create_message(me.id, "bye").unwrap();
    app.state.db.follow(other.id, me.id).unwrap();
    app.login("testuser").await;

    let resp = app.post("/users/delete", &[]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/signup"));

    assert!(app.state.db.get_user(me.id).unwrap().is_none());
    assert!(app.state.db.following(other.id).unwrap().is_empty());

    let home = app.get("/").await;
    assert!(home.body.contains("<h1>What's Happening?</h1>"));
}

#[tokio::test]
async fn delete_account_requires_login() {
    let mut app = TestApp::new();
    let user = app.signup("testuser");
    app.state.db.create_message(user.id, "still here").unwrap();

    let resp = app.post("/users/delete", &[]).await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/"));

    assert!(app.state.db.get_user(user.id).unwrap().is_some());
    assert_eq!(app.state.db.user_stats(user.id).unwrap().messages, 1);
}

#[tokio::test]
async fn delete_account_logs_out_after_removal() {
    let mut app = TestApp::new();
    let me = app.signup("testuser");
    app.login("testuser").await;

    let resp = app.post("/users/delete", &[]).await;
    assert!(app.state.db.get_user(me.id).unwrap().is_none());

    let page = app.follow(resp).await;
    assert!(page.body.contains("Your account has been deleted."));

    let resp = app.get("/users/profile").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/"));
}

// -- CSRF --

#[tokio::test]
async fn anonymous_posts_redirect_home_with_csrf_enabled() {
    let mut app = TestApp::with_config(ApiConfig::default());
    let author = app.signup("author");
    let other = app.signup("other");
    let message = app.state.db.create_message(author.id, "keep me").unwrap();

    let targets = [
        "/messages/new".to_string(),
        format!("/messages/{}/delete", message.id),
        "/users/delete".to_string(),
        "/users/profile".to_string(),
        format!("/users/follow/{}", other.id),
        format!("/users/stop-following/{}", other.id),
    ];

    for target in targets {
        let resp = app
            .post(&target, &[("text", "Hello"), ("password", PASSWORD)])
            .await;
        assert_eq!(resp.status, StatusCode::FOUND, "POST {target}");
        assert_eq!(resp.location.as_deref(), Some("/"), "POST {target}");
    }

    assert!(app.state.db.get_message(message.id).unwrap().is_some());
    assert_eq!(app.state.db.user_stats(author.id).unwrap().messages, 1);
    assert!(app.state.db.get_user(author.id).unwrap().is_some());
    assert!(app.state.db.followers(other.id).unwrap().is_empty());
}

#[tokio::test]
async fn logged_in_post_without_token_is_rejected() {
    let mut app = TestApp::with_config(ApiConfig::default());
    let me = app.signup("testuser");

    let page = app.get("/login").await;
    let token = csrf_token(&page.body).unwrap();
    app.post(
        "/login",
        &[
            ("csrf_token", token.as_str()),
            ("username", "testuser"),
            ("password", PASSWORD),
        ],
    )
    .await;

    let resp = app.post("/messages/new", &[("text", "forged")]).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.state.db.user_stats(me.id).unwrap().messages, 0);
}

#[tokio::test]
async fn csrf_token_is_required_when_enabled() {
    let mut app = TestApp::with_config(ApiConfig::default());
    app.signup("testuser");

    let refused = app
        .post("/login", &[("username", "testuser"), ("password", PASSWORD)])
        .await;
    assert_eq!(refused.status, StatusCode::BAD_REQUEST);

    let page = app.get("/login").await;
    let token = csrf_token(&page.body).expect("login form token");

    let accepted = app
        .post(
            "/login",
            &[
                ("csrf_token", token.as_str()),
                ("username", "testuser"),
                ("password", PASSWORD),
            ],
        )
        .await;
    assert_eq!(accepted.status, StatusCode::FOUND);
}

#[tokio::test]
async fn csrf_token_survives_login() {
    let mut app = TestApp::with_config(ApiConfig::default());
    let me = app.signup("testuser");

    let page = app.get("/login").await;
    let token = csrf_token(&page.body).unwrap();
    app.post(
        "/login",
        &[
            ("csrf_token", token.as_str()),
            ("username", "testuser"),
            ("password", PASSWORD),
        ],
    )
    .await;

    let form = app.get("/messages/new").await;
    let token = csrf_token(&form.body).unwrap();
    let resp = app
        .post("/messages/new", &[("csrf_token", token.as_str()), ("text", "hi")])
        .await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(app.state.db.user_stats(me.id).unwrap().messages, 1);
}
