use ripple::core::kv::MemStore;
use ripple::route;
use serde_json::{json, Value};
use spin_sdk::http::{Method, Request, Response};

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request {
    let mut builder = Request::builder();
    builder.method(method).uri(uri);
    if let Some(t) = token {
        let header = format!("Bearer {}", t);
        builder.header("Authorization", header.as_str());
    }
    let body_vec = body
        .map(|b| serde_json::to_vec(b).expect("body should serialize"))
        .unwrap_or_default();
    builder.body(body_vec).build()
}

fn send(store: &MemStore, method: Method, uri: &str, token: Option<&str>, body: Option<&Value>) -> (u16, Value) {
    let resp: Response = route(store, request(method, uri, token, body)).expect("route should not fail");
    let status = *resp.status();
    let value = if resp.body().is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(resp.body()).expect("response body should be JSON")
    };
    (status, value)
}

/// Register a user and log them in, returning (user_id, token).
fn signup(store: &MemStore, username: &str) -> (String, String) {
    let (status, user) = send(
        store,
        Method::Post,
        "/users",
        None,
        Some(&json!({"username": username, "password": "secret"})),
    );
    assert_eq!(status, 201, "register failed: {:?}", user);
    let user_id = user["id"].as_str().unwrap().to_string();

    let (status, login) = send(
        store,
        Method::Post,
        "/login",
        None,
        Some(&json!({"username": username, "password": "secret"})),
    );
    assert_eq!(status, 200, "login failed: {:?}", login);
    let token = login["token"].as_str().unwrap().to_string();

    (user_id, token)
}

fn create_post(store: &MemStore, token: &str, content: &str) -> Value {
    let (status, post) = send(
        store,
        Method::Post,
        "/posts",
        Some(token),
        Some(&json!({"content": content})),
    );
    assert_eq!(status, 201, "create post failed: {:?}", post);
    post
}

#[test]
fn test_register_login_post_flow() {
    let store = MemStore::new();

    // 1. Register + login
    let (user_id, token) = signup(&store, "flow_user");

    // 2. Duplicate username is rejected
    let (status, err) = send(
        &store,
        Method::Post,
        "/users",
        None,
        Some(&json!({"username": "flow_user", "password": "other"})),
    );
    assert_eq!(status, 409);
    assert_eq!(err["error"], "duplicate_username");

    // 3. Wrong password is rejected
    let (status, err) = send(
        &store,
        Method::Post,
        "/login",
        None,
        Some(&json!({"username": "flow_user", "password": "wrong"})),
    );
    assert_eq!(status, 401);
    assert_eq!(err["error"], "invalid_credentials");

    // 4. Create a post; content comes back trimmed, attributed to the author
    let post = create_post(&store, &token, "  Hello from the integration test!  ");
    assert_eq!(post["content"], "Hello from the integration test!");
    assert_eq!(post["author"], "flow_user");
    assert_eq!(post["author_id"], user_id.as_str());
    assert_eq!(post["likes_count"], 0);

    // 5. Fetch it back by id
    let post_id = post["id"].as_u64().unwrap();
    let (status, fetched) = send(&store, Method::Get, &format!("/posts/{}", post_id), None, None);
    assert_eq!(status, 200);
    assert_eq!(fetched["content"], "Hello from the integration test!");
    assert_eq!(fetched["author"], "flow_user");

    // 6. Unknown post id is a 404
    let (status, err) = send(&store, Method::Get, "/posts/9999", None, None);
    assert_eq!(status, 404);
    assert_eq!(err["error"], "not_found");
}

#[test]
fn test_register_validation() {
    let store = MemStore::new();

    // Password/confirmation mismatch
    let (status, err) = send(
        &store,
        Method::Post,
        "/users",
        None,
        Some(&json!({"username": "newbie", "password": "secret", "confirmation": "different"})),
    );
    assert_eq!(status, 400);
    assert_eq!(err["message"], "Passwords must match.");

    // Matching confirmation goes through
    let (status, _) = send(
        &store,
        Method::Post,
        "/users",
        None,
        Some(&json!({"username": "newbie", "password": "secret", "confirmation": "secret"})),
    );
    assert_eq!(status, 201);
}

#[test]
fn test_post_content_validation() {
    let store = MemStore::new();
    let (_, token) = signup(&store, "writer");

    // Unauthenticated create is rejected before any validation
    let (status, err) = send(&store, Method::Post, "/posts", None, Some(&json!({"content": "hi"})));
    assert_eq!(status, 403);
    assert_eq!(err["error"], "unauthenticated");

    // Blank and whitespace-only content
    for content in ["", "   ", "\n\t "] {
        let (status, err) = send(
            &store,
            Method::Post,
            "/posts",
            Some(&token),
            Some(&json!({"content": content})),
        );
        assert_eq!(status, 400, "content {:?} should be rejected", content);
        assert_eq!(err["error"], "empty_content");
    }

    // Over the configured maximum length
    let long = "x".repeat(5001);
    let (status, _) = send(
        &store,
        Method::Post,
        "/posts",
        Some(&token),
        Some(&json!({"content": long})),
    );
    assert_eq!(status, 400);

    // Nothing was stored
    let (_, feed) = send(&store, Method::Get, "/posts", None, None);
    assert_eq!(feed["items"].as_array().unwrap().len(), 0);
}

#[test]
fn test_edit_post_authorization() {
    let store = MemStore::new();
    let (_, ann_token) = signup(&store, "ann");
    let (_, bob_token) = signup(&store, "bob");

    let post = create_post(&store, &ann_token, "original text");
    let post_id = post["id"].as_u64().unwrap();
    let uri = format!("/posts/{}", post_id);

    // Non-author edit fails and leaves content unchanged
    let (status, err) = send(
        &store,
        Method::Put,
        &uri,
        Some(&bob_token),
        Some(&json!({"content": "hijacked"})),
    );
    assert_eq!(status, 403);
    assert_eq!(err["error"], "forbidden");
    let (_, fetched) = send(&store, Method::Get, &uri, None, None);
    assert_eq!(fetched["content"], "original text");

    // Author edit succeeds and keeps the creation timestamp
    let (status, edited) = send(
        &store,
        Method::Put,
        &uri,
        Some(&ann_token),
        Some(&json!({"content": "revised text"})),
    );
    assert_eq!(status, 200);
    assert_eq!(edited["content"], "revised text");
    assert_eq!(edited["timestamp"], post["timestamp"]);

    // Blank replacement content is rejected
    let (status, err) = send(
        &store,
        Method::Put,
        &uri,
        Some(&ann_token),
        Some(&json!({"content": "  "})),
    );
    assert_eq!(status, 400);
    assert_eq!(err["error"], "empty_content");

    // Editing a missing post is a 404
    let (status, _) = send(
        &store,
        Method::Put,
        "/posts/424242",
        Some(&ann_token),
        Some(&json!({"content": "x"})),
    );
    assert_eq!(status, 404);
}

#[test]
fn test_like_unlike_idempotent() {
    let store = MemStore::new();
    let (_, ann_token) = signup(&store, "ann");
    let (_, bob_token) = signup(&store, "bob");

    let post = create_post(&store, &ann_token, "like me");
    let uri = format!("/posts/{}/like", post["id"].as_u64().unwrap());

    // Unauthenticated like is rejected
    let (status, _) = send(&store, Method::Post, &uri, None, Some(&json!({"action": "like"})));
    assert_eq!(status, 403);

    // Liking twice changes the count by exactly 1, not 2
    let (status, liked) = send(&store, Method::Post, &uri, Some(&bob_token), Some(&json!({"action": "like"})));
    assert_eq!(status, 200);
    assert_eq!(liked["likes"], 1);
    assert_eq!(liked["liked"], true);

    let (_, liked_again) = send(&store, Method::Post, &uri, Some(&bob_token), Some(&json!({"action": "like"})));
    assert_eq!(liked_again["likes"], 1);

    // Unliking returns the count to its original value, idempotently
    let (_, unliked) = send(&store, Method::Post, &uri, Some(&bob_token), Some(&json!({"action": "unlike"})));
    assert_eq!(unliked["likes"], 0);
    assert_eq!(unliked["liked"], false);
    let (_, unliked_again) = send(&store, Method::Post, &uri, Some(&bob_token), Some(&json!({"action": "unlike"})));
    assert_eq!(unliked_again["likes"], 0);

    // Unknown action token
    let (status, err) = send(&store, Method::Post, &uri, Some(&bob_token), Some(&json!({"action": "boost"})));
    assert_eq!(status, 400);
    assert_eq!(err["error"], "invalid_action");

    // Liking a missing post
    let (status, _) = send(&store, Method::Post, "/posts/9999/like", Some(&bob_token), Some(&json!({"action": "like"})));
    assert_eq!(status, 404);
}

#[test]
fn test_follow_unfollow_flow() {
    let store = MemStore::new();
    let (_, ann_token) = signup(&store, "ann");
    signup(&store, "bob");

    // Follow
    let (status, followed) = send(
        &store,
        Method::Post,
        "/profile/bob/follow",
        Some(&ann_token),
        Some(&json!({"action": "follow"})),
    );
    assert_eq!(status, 200, "{:?}", followed);
    assert_eq!(followed["is_following"], true);
    assert_eq!(followed["followers_count"], 1);

    // Re-following is a no-op that still reports success
    let (status, again) = send(
        &store,
        Method::Post,
        "/profile/bob/follow",
        Some(&ann_token),
        Some(&json!({"action": "follow"})),
    );
    assert_eq!(status, 200);
    assert_eq!(again["followers_count"], 1);

    // Self-follow is always rejected
    let (status, err) = send(
        &store,
        Method::Post,
        "/profile/ann/follow",
        Some(&ann_token),
        Some(&json!({"action": "follow"})),
    );
    assert_eq!(status, 400);
    assert_eq!(err["error"], "self_follow");

    // Unknown target
    let (status, err) = send(
        &store,
        Method::Post,
        "/profile/ghost/follow",
        Some(&ann_token),
        Some(&json!({"action": "follow"})),
    );
    assert_eq!(status, 404);
    assert_eq!(err["error"], "user_not_found");

    // Unknown action token
    let (status, err) = send(
        &store,
        Method::Post,
        "/profile/bob/follow",
        Some(&ann_token),
        Some(&json!({"action": "poke"})),
    );
    assert_eq!(status, 400);
    assert_eq!(err["error"], "invalid_action");

    // Unfollow restores pre-follow state, idempotently
    let (_, unfollowed) = send(
        &store,
        Method::Post,
        "/profile/bob/follow",
        Some(&ann_token),
        Some(&json!({"action": "unfollow"})),
    );
    assert_eq!(unfollowed["is_following"], false);
    assert_eq!(unfollowed["followers_count"], 0);
    let (status, _) = send(
        &store,
        Method::Post,
        "/profile/bob/follow",
        Some(&ann_token),
        Some(&json!({"action": "unfollow"})),
    );
    assert_eq!(status, 200);
}

#[test]
fn test_global_feed_pagination() {
    let store = MemStore::new();
    let (_, token) = signup(&store, "prolific");
    for i in 0..25 {
        create_post(&store, &token, &format!("post number {}", i));
    }

    let (status, page1) = send(&store, Method::Get, "/posts?page=1", None, None);
    assert_eq!(status, 200);
    assert_eq!(page1["items"].as_array().unwrap().len(), 10);
    assert_eq!(page1["page"], 1);
    assert_eq!(page1["total_pages"], 3);
    assert_eq!(page1["has_next"], true);
    assert_eq!(page1["has_previous"], false);

    let (_, page3) = send(&store, Method::Get, "/posts?page=3", None, None);
    assert_eq!(page3["items"].as_array().unwrap().len(), 5);
    assert_eq!(page3["has_next"], false);
    assert_eq!(page3["has_previous"], true);

    // Beyond the last page: empty items, metadata intact
    let (status, page4) = send(&store, Method::Get, "/posts?page=4", None, None);
    assert_eq!(status, 200);
    assert_eq!(page4["items"].as_array().unwrap().len(), 0);
    assert_eq!(page4["total_pages"], 3);
    assert_eq!(page4["has_next"], false);

    // Below 1 clamps to 1
    let (_, page0) = send(&store, Method::Get, "/posts?page=0", None, None);
    assert_eq!(page0["page"], 1);
    assert_eq!(page0["items"].as_array().unwrap().len(), 10);
}

#[test]
fn test_feed_ordering_newest_first() {
    let store = MemStore::new();
    let (_, token) = signup(&store, "chrono");
    let first = create_post(&store, &token, "first")["id"].as_u64().unwrap();
    let second = create_post(&store, &token, "second")["id"].as_u64().unwrap();
    let third = create_post(&store, &token, "third")["id"].as_u64().unwrap();

    let (_, feed) = send(&store, Method::Get, "/posts", None, None);
    let ids: Vec<u64> = feed["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_u64().unwrap())
        .collect();
    // Identical timestamps resolve by id, so creation order still wins
    assert_eq!(ids, vec![third, second, first]);
}

#[test]
fn test_profile_feed_and_summary() {
    let store = MemStore::new();
    let (_, ann_token) = signup(&store, "ann");
    let (_, bob_token) = signup(&store, "bob");

    create_post(&store, &ann_token, "ann one");
    create_post(&store, &ann_token, "ann two");
    create_post(&store, &bob_token, "bob one");

    send(
        &store,
        Method::Post,
        "/profile/ann/follow",
        Some(&bob_token),
        Some(&json!({"action": "follow"})),
    );

    // Viewed by bob: summary reflects the edge, feed holds only ann's posts
    let (status, profile) = send(&store, Method::Get, "/profile/ann", Some(&bob_token), None);
    assert_eq!(status, 200);
    assert_eq!(profile["user"]["username"], "ann");
    assert_eq!(profile["user"]["followers_count"], 1);
    assert_eq!(profile["user"]["following_count"], 0);
    assert_eq!(profile["user"]["is_following"], true);
    let items = profile["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|p| p["author"] == "ann"));
    assert_eq!(items[0]["content"], "ann two");

    // Anonymous viewer: no edge reported
    let (_, anon) = send(&store, Method::Get, "/profile/ann", None, None);
    assert_eq!(anon["user"]["is_following"], false);

    // Unknown username
    let (status, err) = send(&store, Method::Get, "/profile/ghost", None, None);
    assert_eq!(status, 404);
    assert_eq!(err["error"], "user_not_found");
}

#[test]
fn test_following_feed() {
    let store = MemStore::new();
    let (_, ann_token) = signup(&store, "ann");
    let (_, bob_token) = signup(&store, "bob");
    let (_, eve_token) = signup(&store, "eve");

    create_post(&store, &bob_token, "from bob");
    create_post(&store, &eve_token, "from eve");
    create_post(&store, &ann_token, "from ann herself");

    // Unauthenticated access is rejected
    let (status, err) = send(&store, Method::Get, "/following", None, None);
    assert_eq!(status, 403);
    assert_eq!(err["error"], "unauthenticated");

    // Following nobody yields an empty page, not an error
    let (status, empty) = send(&store, Method::Get, "/following", Some(&ann_token), None);
    assert_eq!(status, 200);
    assert_eq!(empty["items"].as_array().unwrap().len(), 0);

    // Only posts from followed authors appear
    send(
        &store,
        Method::Post,
        "/profile/bob/follow",
        Some(&ann_token),
        Some(&json!({"action": "follow"})),
    );
    let (_, feed) = send(&store, Method::Get, "/following", Some(&ann_token), None);
    let items = feed["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["author"], "bob");
}

#[test]
fn test_liked_by_viewer_is_per_request() {
    let store = MemStore::new();
    let (_, ann_token) = signup(&store, "ann");
    let (_, bob_token) = signup(&store, "bob");

    let post = create_post(&store, &ann_token, "a likeable post");
    let like_uri = format!("/posts/{}/like", post["id"].as_u64().unwrap());
    send(&store, Method::Post, &like_uri, Some(&bob_token), Some(&json!({"action": "like"})));

    // The liker sees their own flag
    let (_, as_bob) = send(&store, Method::Get, "/posts", Some(&bob_token), None);
    let item = &as_bob["items"].as_array().unwrap()[0];
    assert_eq!(item["likes_count"], 1);
    assert_eq!(item["liked_by_viewer"], true);

    // Anonymous and other viewers see the count but no flag
    let (_, anon) = send(&store, Method::Get, "/posts", None, None);
    let item = &anon["items"].as_array().unwrap()[0];
    assert_eq!(item["likes_count"], 1);
    assert_eq!(item["liked_by_viewer"], false);

    let (_, as_ann) = send(&store, Method::Get, "/posts", Some(&ann_token), None);
    assert_eq!(as_ann["items"][0]["liked_by_viewer"], false);
}

#[test]
fn test_logout_invalidates_token() {
    let store = MemStore::new();
    let (_, token) = signup(&store, "leaver");

    let (status, _) = send(&store, Method::Post, "/logout", Some(&token), None);
    assert_eq!(status, 200);

    let (status, err) = send(
        &store,
        Method::Post,
        "/posts",
        Some(&token),
        Some(&json!({"content": "should not land"})),
    );
    assert_eq!(status, 403);
    assert_eq!(err["error"], "unauthenticated");
}
