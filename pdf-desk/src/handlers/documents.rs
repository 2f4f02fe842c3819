use crate::config::Settings;
use crate::models::{Chunk, DocumentMetadata, PageQuery, PageResult};
use crate::startup::{chunk_list_view, document_list_view};
use crate::view::{ListViewModel, ListViewState, PageSource};
use crate::AppState;

pub async fn list_documents(
    state: &AppState,
    settings: &Settings,
    page: u32,
    search: Option<String>,
) -> anyhow::Result<()> {
    let view = document_list_view(state, &settings.list);
    let data = load_page(&view, page, search).await?;

    if data.is_empty() {
        println!("No documents found");
        return Ok(());
    }

    println!("{:>6}  {:<40}  {:>5}  {}", "ID", "TITLE", "PAGES", "UPLOADED BY");
    for document in &data.items {
        print_document(document);
    }
    print_footer(&data);
    Ok(())
}

pub async fn list_chunks(
    state: &AppState,
    settings: &Settings,
    document_id: i64,
    page: u32,
    search: Option<String>,
) -> anyhow::Result<()> {
    let view = chunk_list_view(state, &settings.list, document_id);
    let data = load_page(&view, page, search).await?;

    if data.is_empty() {
        println!("No chunks found for document {}", document_id);
        return Ok(());
    }

    for chunk in &data.items {
        print_chunk(chunk);
    }
    print_footer(&data);
    Ok(())
}

async fn load_page<S>(
    view: &ListViewModel<S>,
    page: u32,
    search: Option<String>,
) -> anyhow::Result<PageResult<S::Item>>
where
    S: PageSource,
{
    let query = view
        .state()
        .query
        .with_search(search.as_deref().unwrap_or_default())
        .with_page(page);
    view.fetch(query).await;

    let ListViewState { data, error, .. } = view.state();
    match (data, error) {
        (_, Some(error)) => anyhow::bail!(error),
        (Some(data), None) => Ok(data),
        (None, None) => Ok(PageResult::empty(&PageQuery::first(page))),
    }
}

fn print_document(document: &DocumentMetadata) {
    println!(
        "{:>6}  {:<40}  {:>5}  {}",
        document.id,
        truncate(&document.title, 40),
        document.total_pages,
        document.uploaded_by
    );
}

fn print_chunk(chunk: &Chunk) {
    println!("#{} (page {})", chunk.id, chunk.page_number);
    println!("  {}", truncate(chunk.content.trim(), 160));
}

fn print_footer<T>(data: &PageResult<T>) {
    println!(
        "page {} of {} ({} total)",
        data.page,
        data.pages.max(1),
        data.total
    );
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
