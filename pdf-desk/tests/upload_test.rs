//! Upload flow: local validation, notifications and the busy indicator.

mod common;

use common::{bearer, document_json, page_json, TestApp};
use pdf_desk::config::RouteStyle;
use pdf_desk::error::{ClientError, ValidationError};
use pdf_desk::models::{UploadFile, PDF_CONTENT_TYPE};
use pdf_desk::startup::document_list_view;
use pdf_desk::view::{
    BusyIndicator, DocumentCollection, Notification, NotificationLevel, Notifier, UploadFlow,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[derive(Default)]
struct RecordingNotifier(Mutex<Vec<Notification>>);

impl RecordingNotifier {
    fn only(&self) -> Notification {
        let notifications = self.0.lock().unwrap();
        assert_eq!(notifications.len(), 1, "expected one notification");
        notifications[0].clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.0.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
struct CountingBusy {
    shown: AtomicUsize,
    hidden: AtomicUsize,
}

impl CountingBusy {
    fn counts(&self) -> (usize, usize) {
        (
            self.shown.load(Ordering::SeqCst),
            self.hidden.load(Ordering::SeqCst),
        )
    }
}

impl BusyIndicator for CountingBusy {
    fn show(&self) {
        self.shown.fetch_add(1, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.hidden.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    app: TestApp,
    flow: UploadFlow,
    notifier: Arc<RecordingNotifier>,
    busy: Arc<CountingBusy>,
    collection: DocumentCollection,
}

async fn harness(max_file_size: u64) -> Harness {
    let app = TestApp::spawn_logged_in(RouteStyle::V1).await;
    let notifier = Arc::new(RecordingNotifier::default());
    let busy = Arc::new(CountingBusy::default());
    let collection = DocumentCollection::new();

    let flow = UploadFlow::new(
        app.state.document_client.clone(),
        app.state.auth.clone(),
        notifier.clone(),
        busy.clone(),
        Arc::new(collection.clone()),
        max_file_size,
    );

    Harness {
        app,
        flow,
        notifier,
        busy,
        collection,
    }
}

fn pdf(name: &str) -> UploadFile {
    UploadFile::new(name, PDF_CONTENT_TYPE, b"%PDF-1.4 test".to_vec())
}

async fn forbid_network(app: &TestApp) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.server)
        .await;
}

#[tokio::test]
async fn non_pdf_is_rejected_before_sending() {
    let h = harness(1024).await;
    forbid_network(&h.app).await;

    let file = UploadFile::new("notes.txt", "text/plain", b"hello".to_vec());
    let err = h.flow.upload(&[file]).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::NotPdf { .. })
    ));
    let notification = h.notifier.only();
    assert_eq!(notification.level, NotificationLevel::Error);
    assert_eq!(notification.title, "Error");
    assert_eq!(notification.message, "Only PDF files are allowed");
    assert_eq!(h.busy.counts(), (0, 0));
}

#[tokio::test]
async fn several_files_are_rejected() {
    let h = harness(1024).await;
    forbid_network(&h.app).await;

    let err = h.flow.upload(&[pdf("a.pdf"), pdf("b.pdf")]).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Validation(ValidationError::MultipleFiles)
    ));
    assert_eq!(
        h.notifier.only().message,
        "You can only upload one file at a time."
    );
}

#[tokio::test]
async fn empty_selection_and_oversized_files_are_rejected() {
    let h = harness(4).await;
    forbid_network(&h.app).await;

    assert!(matches!(
        h.flow.upload(&[]).await,
        Err(ClientError::Validation(ValidationError::NoFile))
    ));
    assert!(matches!(
        h.flow.upload(&[pdf("big.pdf")]).await,
        Err(ClientError::Validation(ValidationError::TooLarge { limit: 4, .. }))
    ));
    assert_eq!(h.busy.counts(), (0, 0));
}

#[tokio::test]
async fn successful_upload_appends_metadata() {
    let h = harness(1024 * 1024).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/pdf/upload"))
        .and(header("authorization", bearer().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "PDF uploaded successfully",
            "pdf_meta": document_json(12, "report.pdf")
        })))
        .expect(1)
        .mount(&h.app.server)
        .await;

    let response = h.flow.upload(&[pdf("report.pdf")]).await.unwrap();

    assert_eq!(response.filename(), "report.pdf");
    assert_eq!(h.collection.len(), 1);
    assert_eq!(h.collection.snapshot()[0].id, 12);

    let notification = h.notifier.only();
    assert_eq!(notification.level, NotificationLevel::Success);
    assert_eq!(notification.title, "Success");
    assert_eq!(notification.message, "File uploaded successfully!");
    assert_eq!(h.busy.counts(), (1, 1));
}

#[tokio::test]
async fn summary_response_is_accepted() {
    let h = harness(1024 * 1024).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/pdf/upload"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "PDF uploaded successfully",
            "filename": "report.pdf",
            "uploaded_by": "demo@example.com",
            "total_pages": 3
        })))
        .mount(&h.app.server)
        .await;

    let response = h.flow.upload(&[pdf("report.pdf")]).await.unwrap();

    assert!(response.document().is_none());
    assert!(h.collection.is_empty());
    assert_eq!(h.notifier.only().level, NotificationLevel::Success);
}

#[tokio::test]
async fn server_rejection_shows_its_detail() {
    let h = harness(1024 * 1024).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/pdf/upload"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Invalid PDF file"})),
        )
        .mount(&h.app.server)
        .await;

    let err = h.flow.upload(&[pdf("broken.pdf")]).await.unwrap_err();

    assert!(matches!(err, ClientError::Server { .. }));
    let notification = h.notifier.only();
    assert_eq!(notification.title, "Upload Failed");
    assert_eq!(notification.message, "Invalid PDF file");
    assert!(h.collection.is_empty());
    assert_eq!(h.busy.counts(), (1, 1));
}

#[tokio::test]
async fn expired_session_during_upload_logs_out() {
    let h = harness(1024 * 1024).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/pdf/upload"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.app.server)
        .await;

    let err = h.flow.upload(&[pdf("report.pdf")]).await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!h.app.state.auth.is_authenticated());
    let notification = h.notifier.only();
    assert_eq!(notification.title, "Error");
    assert_eq!(
        notification.message,
        "Your session has expired. Please log in again."
    );
    assert_eq!(h.busy.counts(), (1, 1));
}

#[tokio::test]
async fn successful_upload_refreshes_the_document_list() {
    let app = TestApp::spawn_logged_in(RouteStyle::V1).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/pdf/documents"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json(vec![document_json(1, "old.pdf")], 1, 1, 10)),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/pdf/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![document_json(1, "old.pdf"), document_json(2, "new.pdf")],
            2,
            1,
            10,
        )))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pdf/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "PDF uploaded successfully",
            "pdf_meta": document_json(2, "new.pdf")
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let view = document_list_view(&app.state, &app.settings.list);
    view.load().await;
    assert_eq!(view.state().items().len(), 1);

    let flow = UploadFlow::new(
        app.state.document_client.clone(),
        app.state.auth.clone(),
        Arc::new(RecordingNotifier::default()),
        Arc::new(CountingBusy::default()),
        Arc::new(view.refresher()),
        1024 * 1024,
    );
    flow.upload(&[pdf("new.pdf")]).await.unwrap();

    let mut state = view.subscribe();
    let refreshed = tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|state| state.items().len() == 2),
    )
    .await
    .expect("list should be refetched after the upload")
    .expect("view still alive")
    .clone();

    let ids: Vec<i64> = refreshed.items().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![1, 2]);
}
