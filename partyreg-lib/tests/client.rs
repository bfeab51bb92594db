//! Client behaviour against an in-process backend.

mod support;

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use chrono::NaiveDate;
use partyreg_lib::PartyRegClient;
use partyreg_lib::api::ResourceService;
use partyreg_lib::api::RestService;
use partyreg_lib::auth::AccessToken;
use partyreg_lib::auth::AuthFlow;
use partyreg_lib::auth::RefreshEndpointFlow;
use partyreg_lib::auth::SessionTokenProvider;
use partyreg_lib::auth::StaticTokenProvider;
use partyreg_lib::auth::TokenProvider;
use partyreg_lib::error::AuthError;
use partyreg_lib::error::Error;
use partyreg_lib::model::ContactPreference;
use partyreg_lib::model::Student;
use partyreg_lib::model::StudentPayload;
use partyreg_lib::page::PageRequest;
use serde_json::json;
use support::MockServer;
use support::Reply;

fn student_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "pid": format!("73000{id:04}"),
        "email": format!("student{id}@unc.edu"),
        "first_name": "Test",
        "last_name": format!("Student{id}"),
        "phone_number": "9195550142",
        "contact_preference": "text",
        "last_registered": null
    })
}

fn page_json(items: Vec<serde_json::Value>, page_number: u32, total_pages: u32, total: u64) -> serde_json::Value {
    json!({
        "items": items,
        "total_records": total,
        "page_size": 2,
        "page_number": page_number,
        "total_pages": total_pages
    })
}

struct CountingFlow {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

#[async_trait]
impl AuthFlow for CountingFlow {
    async fn refresh(&self, _current: &AccessToken) -> Result<AccessToken, AuthError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            Err(AuthError::RefreshFailed {
                message: "saml session gone".into(),
            })
        } else {
            Ok(AccessToken::new(format!("fresh-{n}")))
        }
    }
}

/// A signed-in session holding a stale token, and its refresh counter.
async fn session(fail: bool) -> (Arc<SessionTokenProvider<CountingFlow>>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let session = Arc::new(SessionTokenProvider::new(CountingFlow {
        calls: Arc::clone(&calls),
        fail,
    }));
    session.sign_in(AccessToken::new("stale")).await;
    (session, calls)
}

fn client(server: &MockServer, provider: Arc<dyn TokenProvider>) -> PartyRegClient {
    PartyRegClient::builder()
        .url(format!("{}/api", server.url))
        .shared_token_provider(provider)
        .build()
        .unwrap()
}

/// Rejects everything but `Bearer fresh-1`.
fn only_fresh(request: &support::Recorded) -> Reply {
    if request.authorization.as_deref() != Some("Bearer fresh-1") {
        return Reply::json(401, json!({"detail": "Not authenticated"}));
    }
    Reply::json(200, page_json(vec![student_json(1)], 1, 1, 1))
}

#[tokio::test]
async fn test_401_refreshes_once_and_replays() {
    let server = MockServer::start(only_fresh).await;
    let (session, calls) = session(false).await;
    let client = client(&server, session);

    let page = client
        .list_page::<Student>(PageRequest::first(25))
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer stale"));
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer fresh-1"));
    assert_eq!(requests[1].path, "/api/students");
    assert_eq!(requests[1].param("page_size").as_deref(), Some("25"));
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start(only_fresh).await;
    let (session, calls) = session(false).await;
    let client = client(&server, session.clone());

    let (a, b, c) = tokio::join!(
        client.list_page::<Student>(PageRequest::first(25)),
        client.list_page::<Student>(PageRequest::first(25)),
        client.list_page::<Student>(PageRequest::first(25)),
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // A second refresh would have produced `fresh-2`, which the server rejects.
    let tokens: Vec<_> = server
        .requests()
        .into_iter()
        .filter_map(|r| r.authorization)
        .filter(|a| a != "Bearer stale")
        .collect();
    assert!(tokens.iter().all(|t| t == "Bearer fresh-1"));
    assert_eq!(session.get_token().await.unwrap().access_token, "fresh-1");
}

#[tokio::test]
async fn test_failed_refresh_signs_out() {
    let server = MockServer::start(only_fresh).await;
    let (session, calls) = session(true).await;
    let client = client(&server, session.clone());

    let err = client
        .list_page::<Student>(PageRequest::first(25))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
    assert!(!session.is_signed_in().await);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_second_401_is_not_retried() {
    let server = MockServer::start(|_| Reply::json(401, json!({"detail": "Not authenticated"}))).await;
    let (session, calls) = session(false).await;
    let client = client(&server, session);

    let err = client.get::<Student>(7).await.unwrap_err();

    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.user_message(), "Not authenticated");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn test_static_provider_401_expires_session() {
    let server = MockServer::start(|_| Reply::status(401)).await;
    let client = client(&server, Arc::new(StaticTokenProvider::new("t")));

    let err = client.get::<Student>(7).await.unwrap_err();
    assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
}

#[tokio::test]
async fn test_list_all_walks_every_page() {
    let server = MockServer::start(|r| {
        let page: u32 = r.param("page_number").and_then(|p| p.parse().ok()).unwrap_or(1);
        let items = match page {
            1 => vec![student_json(1), student_json(2)],
            2 => vec![student_json(3), student_json(4)],
            _ => vec![student_json(5)],
        };
        Reply::json(200, page_json(items, page, 3, 5))
    })
    .await;
    let client = client(&server, Arc::new(StaticTokenProvider::new("t")));

    let students = RestService::<Student>::new(client).list().await.unwrap();

    assert_eq!(
        students.iter().map(|s| s.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5]
    );
    assert_eq!(server.hits("/api/students"), 3);
}

#[tokio::test]
async fn test_create_sends_payload() {
    let server = MockServer::start(|r| {
        let body: serde_json::Value = serde_json::from_str(&r.body).unwrap_or_default();
        let mut created = student_json(9);
        created["email"] = body["email"].clone();
        Reply::json(201, created)
    })
    .await;
    let client = client(&server, Arc::new(StaticTokenProvider::new("t")));

    let payload = StudentPayload {
        pid: "730001234".into(),
        email: "new@unc.edu".into(),
        first_name: "New".into(),
        last_name: "Student".into(),
        phone_number: "9195550142".into(),
        contact_preference: ContactPreference::Call,
    };
    let created = client.create::<Student>(&payload).await.unwrap();

    assert_eq!(created.email, "new@unc.edu");
    let request = &server.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/students");
    let sent: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(sent["contact_preference"], "call");
    assert_eq!(sent["pid"], "730001234");
}

#[tokio::test]
async fn test_server_detail_reaches_user_message() {
    let server = MockServer::start(|_| {
        Reply::json(409, json!({"detail": "A student with this PID already exists"}))
    })
    .await;
    let client = client(&server, Arc::new(StaticTokenProvider::new("t")));

    let err = client.delete::<Student>(3).await.unwrap_err();
    assert_eq!(err.user_message(), "A student with this PID already exists");
    assert_eq!(server.requests()[0].method, "DELETE");
    assert_eq!(server.requests()[0].path, "/api/students/3");
}

#[tokio::test]
async fn test_bad_json_is_a_parse_error() {
    let server = MockServer::start(|_| Reply::json(200, json!({"unexpected": true}))).await;
    let client = client(&server, Arc::new(StaticTokenProvider::new("t")));

    let err = client.get::<Student>(1).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Api(partyreg_lib::error::ApiError::Parse { .. })
    ));
}

#[tokio::test]
async fn test_csv_export() {
    let server = MockServer::start(|_| Reply {
        status: 200,
        headers: vec![
            ("content-type", "text/csv".into()),
            (
                "content-disposition",
                r#"attachment; filename="parties_spring.csv""#.into(),
            ),
        ],
        body: "id,address\n1,12 Rosemary St\n".into(),
    })
    .await;
    let client = client(&server, Arc::new(StaticTokenProvider::new("t")));

    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 5, 31).unwrap();
    let file = client.export_parties_csv(start, end).await.unwrap();

    assert_eq!(file.filename, "parties_spring.csv");
    assert_eq!(file.content_type, "text/csv");
    assert_eq!(file.bytes, b"id,address\n1,12 Rosemary St\n");

    let request = &server.requests()[0];
    assert_eq!(request.path, "/api/parties/csv");
    assert_eq!(request.param("start_date").as_deref(), Some("2025-01-01"));
    assert_eq!(request.param("end_date").as_deref(), Some("2025-05-31"));
}

#[tokio::test]
async fn test_nearby_query() {
    let server = MockServer::start(|_| Reply::json(200, json!([]))).await;
    let client = client(&server, Arc::new(StaticTokenProvider::new("t")));

    let day = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
    let parties = client.parties_nearby("ChIJ Rosemary", day, day).await.unwrap();

    assert!(parties.is_empty());
    let request = &server.requests()[0];
    assert_eq!(request.path, "/api/parties/nearby");
    assert_eq!(request.param("place_id").as_deref(), Some("ChIJ Rosemary"));
}

#[tokio::test]
async fn test_refresh_endpoint_flow() {
    let server = MockServer::start(|r| {
        if r.body.contains("grant_type=refresh_token") && r.body.contains("refresh_token=r1") {
            Reply::json(200, json!({"access_token": "a2", "expires_in": 3600}))
        } else {
            Reply::json(400, json!({"detail": "invalid refresh token"}))
        }
    })
    .await;

    let flow = RefreshEndpointFlow::new(&format!("{}/auth/refresh", server.url)).unwrap();

    let token = flow
        .refresh(&AccessToken::with_refresh("a1", None, "r1"))
        .await
        .unwrap();
    assert_eq!(token.access_token, "a2");
    assert_eq!(token.refresh_token.as_deref(), Some("r1"));
    assert!(token.expires_at.is_some());

    let err = flow
        .refresh(&AccessToken::with_refresh("a1", None, "bad"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RefreshFailed { message } if message == "invalid refresh token"));

    let err = flow.refresh(&AccessToken::new("a1")).await.unwrap_err();
    assert!(matches!(err, AuthError::RefreshFailed { .. }));
    assert_eq!(server.requests().len(), 2);
}
