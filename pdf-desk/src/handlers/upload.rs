use crate::config::Settings;
use crate::models::UploadFile;
use crate::view::{
    BusyIndicator, DocumentCollection, Notification, NotificationLevel, Notifier, UploadFlow,
};
use crate::AppState;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;

/// Prints notifications to the terminal.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                println!("{}: {}", notification.title, notification.message)
            }
            NotificationLevel::Error => {
                eprintln!("{}: {}", notification.title, notification.message)
            }
        }
    }
}

pub struct ConsoleBusy;

impl BusyIndicator for ConsoleBusy {
    fn show(&self) {
        eprintln!("Uploading...");
    }

    fn hide(&self) {}
}

pub async fn upload(state: &AppState, settings: &Settings, path: &Path) -> anyhow::Result<()> {
    let file = UploadFile::from_path(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let collection = DocumentCollection::new();
    let flow = UploadFlow::new(
        state.document_client.clone(),
        state.auth.clone(),
        Arc::new(ConsoleNotifier),
        Arc::new(ConsoleBusy),
        Arc::new(collection.clone()),
        settings.upload.max_file_size_bytes,
    );

    // The flow has already reported the failure to the user.
    let response = flow
        .upload(std::slice::from_ref(&file))
        .await
        .map_err(|_| anyhow::anyhow!("upload of {} failed", file.file_name))?;

    for document in collection.snapshot() {
        println!(
            "{}  {} ({} pages)",
            document.id, document.title, document.total_pages
        );
    }
    if collection.is_empty() {
        println!("{}", response.filename());
    }
    Ok(())
}
