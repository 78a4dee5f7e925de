//! Integration tests for the posts list: the controller issues requests,
//! the client runs them against a mock backend, and the outcomes are fed
//! back the way the dashboard's background tasks do it.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use tgrss_dash::api::{ApiClient, PushStatus};
use tgrss_dash::pagination::PageControl;
use tgrss_dash::posts::{Applied, PostsController, PostsRequest};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(
        &server.uri(),
        SecretString::from("session-xyz"),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn posts_body(page: u32, total_pages: u32, ids: &[i64]) -> serde_json::Value {
    let posts: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({
                "post_id": id,
                "title": format!("post {}", id),
                "creator": "alice",
                "category": "trade",
                "pub_date": "2024-05-01T08:00:00Z",
                "push_status": 0
            })
        })
        .collect();
    json!({
        "success": true,
        "data": {
            "posts": posts,
            "total": u64::from(total_pages) * 20,
            "page": page,
            "totalPages": total_pages
        }
    })
}

async fn run(
    controller: &mut PostsController,
    client: &ApiClient,
    req: PostsRequest,
) -> Applied {
    match client.list_posts(req.page, req.limit, &req.filters).await {
        Ok(page) => controller.apply(req.seq, page),
        Err(_) => controller.fail(req.seq),
    }
}

#[tokio::test]
async fn test_first_load_fills_page_and_strip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("page", "1"))
        .and(query_param("limit", "20"))
        .and(query_param_is_missing("search"))
        .and(query_param_is_missing("pushStatus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts_body(1, 10, &[1, 2, 3])))
        .expect(1)
        .mount(&server)
        .await;

    let c = client(&server).await;
    let mut posts = PostsController::new(20, Duration::from_millis(500));
    let req = posts.refresh();
    assert_eq!(run(&mut posts, &c, req).await, Applied::Current);

    assert!(posts.has_loaded());
    assert!(!posts.is_loading());
    assert_eq!(posts.posts().len(), 3);
    assert_eq!(posts.page().total_pages, 10);
    assert_eq!(
        posts.strip(),
        vec![
            PageControl::Page {
                number: 1,
                active: true
            },
            PageControl::Page {
                number: 2,
                active: false
            },
            PageControl::Ellipsis,
            PageControl::Page {
                number: 10,
                active: false
            },
        ]
    );
}

#[tokio::test]
async fn test_submitted_filters_reach_the_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("search", "cheap vps"))
        .and(query_param("pushStatus", "0"))
        .and(query_param_is_missing("creator"))
        .and(query_param_is_missing("category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts_body(1, 1, &[9])))
        .expect(1)
        .mount(&server)
        .await;

    let c = client(&server).await;
    let mut posts = PostsController::new(20, Duration::from_millis(500));
    for ch in "cheap vps".chars() {
        posts.input_char(ch);
    }
    posts.cycle_push_status();
    let req = posts.submit();
    assert_eq!(req.page, 1);
    assert_eq!(run(&mut posts, &c, req).await, Applied::Current);
    assert_eq!(posts.posts()[0].push_status, PushStatus::Pending);
}

#[tokio::test]
async fn test_out_of_order_responses_keep_latest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("search", "old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts_body(1, 1, &[100])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param_is_missing("search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts_body(1, 1, &[200])))
        .mount(&server)
        .await;

    let c = client(&server).await;
    let mut posts = PostsController::new(20, Duration::from_millis(500));
    for ch in "old".chars() {
        posts.input_char(ch);
    }
    let older = posts.submit();
    let newer = posts.clear();

    // The newer request completes first; the older one arrives late.
    assert_eq!(run(&mut posts, &c, newer).await, Applied::Current);
    assert_eq!(run(&mut posts, &c, older).await, Applied::Stale);

    assert_eq!(posts.posts()[0].post_id, 200);
    assert!(posts.filters().is_empty());
}

#[tokio::test]
async fn test_failed_page_change_keeps_displayed_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts_body(1, 3, &[1, 2])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let c = client(&server).await;
    let mut posts = PostsController::new(20, Duration::from_millis(500));
    let req = posts.refresh();
    run(&mut posts, &c, req).await;

    let req = posts.next_page().unwrap();
    assert_eq!(req.page, 2);
    assert_eq!(run(&mut posts, &c, req).await, Applied::Current);

    assert_eq!(posts.page().current_page, 1);
    assert_eq!(posts.page().total_pages, 3);
    assert_eq!(posts.posts().len(), 2);
    assert!(!posts.is_loading());
}

#[tokio::test]
async fn test_unauthorized_posts_fetch_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let c = client(&server).await;
    let mut posts = PostsController::new(20, Duration::from_millis(500));
    let req = posts.refresh();
    let err = c
        .list_posts(req.page, req.limit, &req.filters)
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(posts.fail(req.seq), Applied::Current);
    assert!(!posts.has_loaded());
}
