pub mod list_view;
pub mod notify;
pub mod page_sources;
pub mod upload;

pub use list_view::{FetchOutcome, ListRefresher, ListViewModel, ListViewState, PageSource, SearchFocus, ViewPhase};
pub use notify::{BusyIndicator, Notification, NotificationLevel, Notifier};
pub use page_sources::{ChunkPages, DocumentPages};
pub use upload::{DocumentCollection, UploadFlow, UploadSink};
