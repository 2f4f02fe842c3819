//! Paginated, searchable list view model.
//!
//! One generic model backs both the document list and the chunk list. It owns
//! a [`ListViewState`] published through a `watch` channel; a UI subscribes to
//! it and forwards user events (`set_search`, `set_page`, ...).
//!
//! Ordering: every fetch takes a sequence number when issued and only the most
//! recently issued fetch may write its result. Search typing is debounced; a
//! new keystroke cancels the scheduled fetch, never one already in flight.

use crate::error::ClientError;
use crate::models::page::normalize_search;
use crate::models::{PageQuery, PageResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Where a list view gets its pages from.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    async fn fetch_page(&self, query: &PageQuery) -> Result<PageResult<Self::Item>, ClientError>;

    /// Message shown when a fetch fails without a server-provided detail.
    fn failure_message(&self) -> &'static str {
        "Failed to load items. Please try again later."
    }
}

/// Lets the model hand keyboard focus back to the search input.
pub trait SearchFocus: Send + Sync {
    fn focus_search(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone)]
pub struct ListViewState<T> {
    /// Last successfully loaded page. Kept on failure so stale data stays
    /// visible next to the error.
    pub data: Option<PageResult<T>>,
    pub loading: bool,
    pub error: Option<String>,
    /// Query of the most recently issued fetch.
    pub query: PageQuery,
    /// What the search input displays; updated on every keystroke.
    pub search_input: String,
    /// True from scheduling a fetch until its result is applied.
    pub is_searching: bool,
    pub phase: ViewPhase,
}

impl<T> ListViewState<T> {
    fn new(query: PageQuery) -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            query,
            search_input: String::new(),
            is_searching: false,
            phase: ViewPhase::Idle,
        }
    }

    pub fn items(&self) -> &[T] {
        self.data.as_ref().map(|page| page.items.as_slice()).unwrap_or(&[])
    }

    pub fn total_pages(&self) -> u64 {
        self.data.as_ref().map(|page| page.pages).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result (success or failure) was written to the state.
    Applied,
    /// A newer fetch was issued meanwhile; the result was dropped.
    Stale,
    /// The view was torn down.
    Cancelled,
}

struct PendingSearch {
    id: u64,
    token: CancellationToken,
}

struct Shared<S: PageSource> {
    source: S,
    state: watch::Sender<ListViewState<S::Item>>,
    issued: AtomicU64,
    debounce: Duration,
    pending: Mutex<Option<PendingSearch>>,
    next_search_id: AtomicU64,
    search_focused: AtomicBool,
    focus: Mutex<Option<Arc<dyn SearchFocus>>>,
    lifetime: CancellationToken,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl<S: PageSource> Shared<S> {
    fn current_query(&self) -> PageQuery {
        self.state.borrow().query.clone()
    }

    fn has_pending_search(&self) -> bool {
        lock(&self.pending).is_some()
    }

    /// Forget the scheduled search `id` once its timer fired, unless a newer
    /// one replaced it already.
    fn finish_pending(&self, id: u64) {
        let mut pending = lock(&self.pending);
        if pending.as_ref().is_some_and(|p| p.id == id) {
            *pending = None;
        }
    }

    async fn run_fetch(&self, query: PageQuery) -> FetchOutcome {
        if self.lifetime.is_cancelled() {
            return FetchOutcome::Cancelled;
        }

        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            state.query = query.clone();
            state.loading = true;
            state.is_searching = true;
            state.phase = ViewPhase::Loading;
        });

        let result = tokio::select! {
            _ = self.lifetime.cancelled() => {
                tracing::debug!(seq, "List view closed with fetch in flight");
                return FetchOutcome::Cancelled;
            }
            result = self.source.fetch_page(&query) => result,
        };

        if let Err(e) = &result {
            tracing::warn!(page = query.page, search = ?query.search, error = %e, "Page fetch failed");
        }

        let failure_message = self.source.failure_message();
        let pending_search = self.has_pending_search();
        let applied = self.state.send_if_modified(|state| {
            if self.issued.load(Ordering::SeqCst) != seq {
                return false;
            }
            state.loading = false;
            state.is_searching = pending_search;
            match result {
                Ok(page) => {
                    state.data = Some(page);
                    state.error = None;
                    state.phase = ViewPhase::Loaded;
                }
                Err(e) => {
                    state.error = Some(e.user_message(failure_message));
                    state.phase = ViewPhase::Failed;
                }
            }
            true
        });

        if !applied {
            tracing::debug!(seq, page = query.page, "Discarding stale page response");
            return FetchOutcome::Stale;
        }

        if !pending_search && self.search_focused.load(Ordering::SeqCst) {
            let focus = lock(&self.focus).clone();
            if let Some(focus) = focus {
                focus.focus_search();
            }
        }

        FetchOutcome::Applied
    }
}

pub struct ListViewModel<S: PageSource> {
    shared: Arc<Shared<S>>,
}

impl<S: PageSource> ListViewModel<S> {
    pub fn new(source: S, page_size: u32, debounce: Duration) -> Self {
        let (state, _) = watch::channel(ListViewState::new(PageQuery::first(page_size)));

        Self {
            shared: Arc::new(Shared {
                source,
                state,
                issued: AtomicU64::new(0),
                debounce,
                pending: Mutex::new(None),
                next_search_id: AtomicU64::new(0),
                search_focused: AtomicBool::new(false),
                focus: Mutex::new(None),
                lifetime: CancellationToken::new(),
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.shared.source
    }

    pub fn state(&self) -> ListViewState<S::Item> {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListViewState<S::Item>> {
        self.shared.state.subscribe()
    }

    pub fn set_focus_target(&self, target: Arc<dyn SearchFocus>) {
        *lock(&self.shared.focus) = Some(target);
    }

    /// Record whether the search input currently has keyboard focus.
    pub fn set_search_focused(&self, focused: bool) {
        self.shared.search_focused.store(focused, Ordering::SeqCst);
    }

    pub fn has_pending_search(&self) -> bool {
        self.shared.has_pending_search()
    }

    /// Fetch the current query. Used for the first render.
    pub async fn load(&self) -> FetchOutcome {
        let query = self.shared.current_query();
        self.shared.run_fetch(query).await
    }

    /// Fetch `query` and apply the result, unless superseded.
    pub async fn fetch(&self, query: PageQuery) -> FetchOutcome {
        self.shared.run_fetch(query).await
    }

    /// Update the search input and schedule a debounced fetch from page 1.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn set_search(&self, text: impl Into<String>) {
        let text = text.into();
        self.shared.state.send_modify(|state| {
            state.search_input = text.clone();
            state.is_searching = true;
        });

        let id = self.shared.next_search_id.fetch_add(1, Ordering::SeqCst) + 1;
        let token = self.shared.lifetime.child_token();
        let previous = lock(&self.shared.pending).replace(PendingSearch {
            id,
            token: token.clone(),
        });
        if let Some(previous) = previous {
            previous.token.cancel();
        }

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(shared.debounce) => {}
            }
            shared.finish_pending(id);

            let query = shared.current_query().with_search(&text);
            tracing::debug!(search = ?query.search, "Debounced search fired");
            shared.run_fetch(query).await;
        });
    }

    /// Fetch page `page` right away with the displayed search text.
    pub fn set_page(&self, page: u32) -> JoinHandle<FetchOutcome> {
        let query = {
            let state = self.shared.state.borrow();
            PageQuery {
                page,
                size: state.query.size,
                search: normalize_search(&state.search_input),
            }
        };
        self.spawn_fetch(query)
    }

    /// Next page, if the loaded data has one.
    pub fn next_page(&self) -> Option<JoinHandle<FetchOutcome>> {
        let target = {
            let state = self.shared.state.borrow();
            state
                .data
                .as_ref()
                .filter(|page| page.has_next())
                .map(|page| page.page + 1)
        };
        target.map(|page| self.set_page(page))
    }

    pub fn previous_page(&self) -> Option<JoinHandle<FetchOutcome>> {
        let target = {
            let state = self.shared.state.borrow();
            state
                .data
                .as_ref()
                .filter(|page| page.has_previous())
                .map(|page| page.page - 1)
        };
        target.map(|page| self.set_page(page))
    }

    /// Re-fetch the current query.
    pub fn refresh(&self) -> JoinHandle<FetchOutcome> {
        let query = self.shared.current_query();
        self.spawn_fetch(query)
    }

    /// Handle that refreshes this view from elsewhere, e.g. after an upload.
    /// It does nothing once the view is gone.
    pub fn refresher(&self) -> ListRefresher {
        let weak: Weak<Shared<S>> = Arc::downgrade(&self.shared);
        ListRefresher {
            refresh: Arc::new(move || {
                if let Some(shared) = weak.upgrade() {
                    let query = shared.current_query();
                    tokio::spawn(async move {
                        shared.run_fetch(query).await;
                    });
                }
            }),
        }
    }

    fn spawn_fetch(&self, query: PageQuery) -> JoinHandle<FetchOutcome> {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { shared.run_fetch(query).await })
    }
}

impl<S: PageSource> Drop for ListViewModel<S> {
    fn drop(&mut self) {
        // Cancels the scheduled search (child token) and in-flight fetches.
        self.shared.lifetime.cancel();
    }
}

#[derive(Clone)]
pub struct ListRefresher {
    refresh: Arc<dyn Fn() + Send + Sync>,
}

impl ListRefresher {
    pub fn refresh(&self) {
        (self.refresh)()
    }
}

impl std::fmt::Debug for ListRefresher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListRefresher").finish_non_exhaustive()
    }
}
