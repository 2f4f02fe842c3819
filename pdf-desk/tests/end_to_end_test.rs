//! Login, browse and page through documents against the unversioned routes.
//! Token validation always goes through the versioned API.

mod common;

use common::{bearer, document_json, page_json, valid_token_json, TestApp, TEST_PASSWORD, TEST_TOKEN, TEST_USER};
use pdf_desk::config::RouteStyle;
use pdf_desk::handlers::{self, Command};
use pdf_desk::startup::{chunk_list_view, document_list_view};
use pdf_desk::view::FetchOutcome;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn mount_legacy_backend(app: &TestApp) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("username=demo%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TEST_TOKEN,
            "token_type": "bearer"
        })))
        .mount(&app.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/validate-token"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(valid_token_json()))
        .mount(&app.server)
        .await;

    let first: Vec<_> = (1..=10).map(|id| document_json(id, &format!("doc-{}.pdf", id))).collect();
    let second: Vec<_> = (11..=12).map(|id| document_json(id, &format!("doc-{}.pdf", id))).collect();

    Mock::given(method("GET"))
        .and(path("/pdfs"))
        .and(query_param("page", "1"))
        .and(query_param("size", "10"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(first, 12, 1, 10)))
        .mount(&app.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pdfs"))
        .and(query_param("page", "2"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(second, 12, 2, 10)))
        .expect(1)
        .mount(&app.server)
        .await;
}

#[tokio::test]
async fn login_then_browse_documents() {
    let app = TestApp::spawn(RouteStyle::Legacy).await;
    mount_legacy_backend(&app).await;

    app.state
        .auth
        .login_with_password(TEST_USER, TEST_PASSWORD)
        .await
        .expect("login should succeed");
    assert!(app.state.auth.check_token_validity().await);

    let view = document_list_view(&app.state, &app.settings.list);
    assert_eq!(view.load().await, FetchOutcome::Applied);

    let state = view.state();
    assert_eq!(state.items().len(), 10);
    assert_eq!(state.total_pages(), 2);
    assert_eq!(state.items()[0].title, "doc-1.pdf");

    let outcome = view.next_page().expect("second page").await.unwrap();
    assert_eq!(outcome, FetchOutcome::Applied);

    let state = view.state();
    assert_eq!(state.data.as_ref().map(|page| page.page), Some(2));
    assert_eq!(state.items().len(), 2);
    assert!(view.next_page().is_none());
}

#[tokio::test]
async fn chunks_accept_legacy_field_names() {
    let app = TestApp::spawn_logged_in(RouteStyle::Legacy).await;

    Mock::given(method("GET"))
        .and(path("/pdf_chunks/5"))
        .and(query_param("search", "revenue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![json!({"id": 40, "pdf_id": 5, "page_number": 2, "content": "Revenue grew"})],
            1,
            1,
            10,
        )))
        .mount(&app.server)
        .await;

    let view = chunk_list_view(&app.state, &app.settings.list, 5);
    let query = view.state().query.with_search("revenue");
    assert_eq!(view.fetch(query).await, FetchOutcome::Applied);

    let chunk = view.state().items()[0].clone();
    assert_eq!(chunk.document_id, 5);
    assert_eq!(chunk.page_number, 2);
}

#[tokio::test]
async fn guarded_commands_require_a_session() {
    let app = TestApp::spawn(RouteStyle::Legacy).await;

    let err = handlers::run(Command::Status, &app.state, &app.settings)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not logged in"));
}

#[tokio::test]
async fn cli_login_and_listing() {
    let app = TestApp::spawn(RouteStyle::Legacy).await;
    mount_legacy_backend(&app).await;

    handlers::run(
        Command::Login {
            username: TEST_USER.to_string(),
            password: TEST_PASSWORD.to_string(),
        },
        &app.state,
        &app.settings,
    )
    .await
    .expect("login command");
    assert_eq!(app.stored_token().as_deref(), Some(TEST_TOKEN));

    handlers::run(
        Command::Documents {
            page: 2,
            search: None,
        },
        &app.state,
        &app.settings,
    )
    .await
    .expect("documents command");

    handlers::run(Command::Logout, &app.state, &app.settings)
        .await
        .expect("logout command");
    assert!(app.stored_token().is_none());
}
