mod common;

use std::sync::Arc;
use std::time::Duration;

use common::MockBackend;
use dailygrind::auth::SessionToken;
use dailygrind::config::ApiConfig;
use dailygrind::core::client::ApiClient;
use dailygrind::core::errors::GatewayError;
use dailygrind::models::models::{NewPost, Post, PushKeys, PushSubscription, UserEducation, UserJob};
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn client(base: &str, token: &str) -> ApiClient {
    ApiClient::new(
        ApiConfig::Gateway(base.to_string()),
        Arc::new(SessionToken::new(token)),
    )
}

#[tokio::test]
async fn test_fetch_me_sends_bearer_token() {
    let backend = MockBackend::new();
    backend.on(
        "GET",
        "/users/me",
        200,
        json!({"userId": "u1", "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com"})
            .to_string(),
    );
    let base = backend.start().await;

    let me = client(&base, "tok-123").fetch_me().await.unwrap();
    assert_eq!(me.user_id, "u1");
    assert_eq!(me.first_name, "Ada");

    let calls = backend.requests_to("GET", "/users/me");
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].headers.get("authorization").map(String::as_str),
        Some("Bearer tok-123")
    );
}

#[tokio::test]
async fn test_error_status_carries_server_message() {
    let backend = MockBackend::new();
    backend.on(
        "POST",
        "/posts/posts",
        400,
        "You already have a daily post for today",
    );
    let base = backend.start().await;

    let err = client(&base, "tok")
        .create_post(&NewPost {
            title: "Monday".to_string(),
            content: "coffee".to_string(),
        })
        .await
        .unwrap_err();

    match err {
        GatewayError::Status { status, message } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "You already have a daily post for today");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let sent: serde_json::Value =
        serde_json::from_str(&backend.requests_to("POST", "/posts/posts")[0].body).unwrap();
    assert_eq!(sent, json!({"title": "Monday", "content": "coffee"}));
}

#[tokio::test]
async fn test_daily_post_missing_is_none() {
    let backend = MockBackend::new();
    let base = backend.start().await;
    let api = client(&base, "tok");

    assert_eq!(api.fetch_daily_post().await.unwrap(), None);

    backend.on(
        "GET",
        "/posts/users/me/daily-post",
        200,
        json!({"postId": "p1", "title": "Hi", "content": "there", "timestamp": "1718000000000"})
            .to_string(),
    );
    let post = api.fetch_daily_post().await.unwrap().unwrap();
    assert_eq!(post.post_id, "p1");
}

#[tokio::test]
async fn test_missing_token_fails_without_calling_backend() {
    let backend = MockBackend::new();
    let base = backend.start().await;
    let api = ApiClient::new(
        ApiConfig::Gateway(base),
        Arc::new(SessionToken::default()),
    );

    let err = api.fetch_friends().await.unwrap_err();
    assert!(matches!(err, GatewayError::Unauthenticated));
    assert!(err.is_auth());
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_cancelled_scope_aborts_call() {
    let backend = MockBackend::new();
    backend.on("GET", "/posts/users/me/timeline", 200, "[]");
    let base = backend.start().await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = client(&base, "tok")
        .scoped(cancel)
        .fetch_timeline()
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Cancelled));
}

#[tokio::test]
async fn test_friend_request_paths() {
    let backend = MockBackend::new();
    backend.on("POST", "/users/requests?targetUserId=u%202", 200, "");
    backend.on("DELETE", "/users/requests/r1/cancel", 204, "");
    backend.on(
        "GET",
        "/users/requests/incoming",
        200,
        json!([{"requestId": "r2", "senderId": "u3", "firstName": "Grace", "lastName": "Hopper"}])
            .to_string(),
    );
    let base = backend.start().await;
    let api = client(&base, "tok");

    api.send_friend_request("u 2").await.unwrap();
    api.cancel_friend_request("r1").await.unwrap();
    let incoming = api.fetch_incoming_requests().await.unwrap();
    assert_eq!(incoming[0].sender_id, "u3");

    let err = api.accept_friend_request("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_push_subscription_is_registered() {
    let backend = MockBackend::new();
    backend.on("POST", "/push-notifications/subscribe", 201, "");
    backend.on("POST", "/push-notifications/send", 200, "");
    let base = backend.start().await;

    let subscription = PushSubscription {
        endpoint: "https://push.example/abc".to_string(),
        expiration_time: None,
        keys: PushKeys {
            p256dh: "key".to_string(),
            auth: "secret".to_string(),
        },
    };
    client(&base, "tok")
        .register_push_subscription(&subscription)
        .await
        .unwrap();

    let sent: PushSubscription = serde_json::from_str(
        &backend.requests_to("POST", "/push-notifications/subscribe")[0].body,
    )
    .unwrap();
    assert_eq!(sent, subscription);

    client(&base, "tok").trigger_push("Time to post").await.unwrap();
    let calls = backend.requests_to("POST", "/push-notifications/send");
    let call = &calls[0];
    assert_eq!(call.body, "Time to post");
    assert_eq!(
        call.headers.get("content-type").map(String::as_str),
        Some("text/plain")
    );
}

#[tokio::test]
async fn test_cancel_interrupts_slow_body() {
    let backend = MockBackend::new();
    backend.on_stalled("GET", "/posts/users/me/timeline", 200, "[{\"post\":");
    let base = backend.start().await;

    let cancel = CancellationToken::new();
    let api = client(&base, "tok").scoped(cancel.clone());
    let call = tokio::spawn(async move { api.fetch_timeline().await });

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(backend.requests_to("GET", "/posts/users/me/timeline").len(), 1);
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(2), call)
        .await
        .expect("call did not stop after cancel")
        .unwrap();
    assert!(matches!(result, Err(GatewayError::Cancelled)));
}

#[tokio::test]
async fn test_endpoints_hit_expected_routes() {
    let backend = MockBackend::new();
    let routes = [
        ("DELETE", "/users/me", ""),
        ("GET", "/users/u%201", "{}"),
        ("GET", "/users/search?name=Ada%20L%26ove", "[]"),
        ("PUT", "/users/me/jobs/j1", "{}"),
        ("DELETE", "/users/me/jobs/j1", ""),
        ("POST", "/users/me/education", "{}"),
        ("PUT", "/users/me/education/e1", "{}"),
        ("DELETE", "/users/me/education/e1", ""),
        ("GET", "/posts/users/u1/posts", "[]"),
        ("GET", "/posts/posts/p1", "{}"),
        ("PUT", "/posts/posts/p1", "{}"),
        ("DELETE", "/posts/posts/p1/likes", ""),
        ("GET", "/posts/posts/p1/comments", "[]"),
        ("DELETE", "/posts/posts/p1/comments/c1", ""),
        ("GET", "/posts/users/me/pinned-posts", "[]"),
        ("DELETE", "/posts/users/me/pinned-posts/p1", ""),
        ("POST", "/users/requests/r1/decline", ""),
        ("GET", "/users/requests/outgoing", "[]"),
        ("DELETE", "/users/friends/f1/remove", ""),
    ];
    for (method, path, body) in routes {
        backend.on(method, path, 200, body);
    }
    let base = backend.start().await;
    let api = client(&base, "tok");

    let job = UserJob {
        job_id: "j1".to_string(),
        ..Default::default()
    };
    let education = UserEducation {
        education_id: "e1".to_string(),
        ..Default::default()
    };
    let post = Post {
        post_id: "p1".to_string(),
        ..Default::default()
    };

    api.delete_me().await.unwrap();
    api.fetch_user("u 1").await.unwrap();
    api.search_users("Ada L&ove").await.unwrap();
    api.update_job(&job).await.unwrap();
    api.delete_job("j1").await.unwrap();
    api.add_education(&education).await.unwrap();
    api.update_education(&education).await.unwrap();
    api.delete_education("e1").await.unwrap();
    api.fetch_user_posts("u1").await.unwrap();
    api.fetch_post("p1").await.unwrap();
    api.update_post(&post).await.unwrap();
    api.unlike_post("p1").await.unwrap();
    api.fetch_comments("p1").await.unwrap();
    api.delete_comment("p1", "c1").await.unwrap();
    api.fetch_my_pinned_posts().await.unwrap();
    api.unpin_post("p1").await.unwrap();
    api.decline_friend_request("r1").await.unwrap();
    api.fetch_outgoing_requests().await.unwrap();
    api.remove_friend("f1").await.unwrap();

    let hit: Vec<(String, String)> = backend
        .requests()
        .into_iter()
        .map(|r| (r.method, r.path))
        .collect();
    let expected: Vec<(String, String)> = routes
        .iter()
        .map(|(m, p, _)| (m.to_string(), p.to_string()))
        .collect();
    assert_eq!(hit, expected);

    let put = &backend.requests_to("PUT", "/users/me/jobs/j1")[0];
    let sent: serde_json::Value = serde_json::from_str(&put.body).unwrap();
    assert_eq!(sent["jobId"], "j1");
}

#[tokio::test]
async fn test_profile_picture_upload() {
    let backend = MockBackend::new();
    backend.on_prefix("PUT", "/pictures/users/", 200, "");
    let base = backend.start().await;
    let api = client(&base, "tok").with_picture_bucket(format!("{base}/pictures/"));

    let url = api
        .upload_profile_picture(b"png-bytes".to_vec(), "my face.png", "image/png")
        .await
        .unwrap();
    assert!(url.starts_with(&format!("{base}/pictures/users/")));
    assert!(url.ends_with("/my%20face.png"));

    let calls = backend.requests();
    assert_eq!(calls.len(), 1);
    assert_eq!(format!("{base}{}", calls[0].path), url);
    assert_eq!(calls[0].body, "png-bytes");
    assert_eq!(
        calls[0].headers.get("content-type").map(String::as_str),
        Some("image/png")
    );
    assert!(calls[0].headers.get("authorization").is_none());

    let second = api
        .upload_profile_picture(b"png".to_vec(), "my face.png", "image/png")
        .await
        .unwrap();
    assert_ne!(second, url);
}

#[tokio::test]
async fn test_rejected_picture_upload_is_an_error() {
    let backend = MockBackend::new();
    backend.on_prefix("PUT", "/pictures/users/", 403, "AccessDenied");
    let base = backend.start().await;
    let api = client(&base, "tok").with_picture_bucket(format!("{base}/pictures"));

    let err = api
        .upload_profile_picture(b"png".to_vec(), "me.png", "image/png")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Status { status, .. } if status.as_u16() == 403));
}
